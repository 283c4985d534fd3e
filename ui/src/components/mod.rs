//! Copied from [`DioxusLabs/components`].
//!
//! [`DioxusLabs/components`]: https://github.com/DioxusLabs/components/blob/3571d90aa55773c59b05119d9fff8879da6b8a3d/primitives/src/lib.rs

use dioxus::prelude::*;

pub mod button;
pub mod checkbox;
pub mod indicator;
pub mod labeled;
pub mod numbers;
pub mod section;
pub mod text;

fn use_controlled<T: Clone + PartialEq + 'static>(
    current_value: ReadSignal<Option<T>>,
    default_value: T,
    on_value: Callback<T>,
) -> (Memo<T>, Callback<T>) {
    let mut inner_value = use_signal(|| current_value.cloned().unwrap_or(default_value));
    let value = use_memo(move || current_value.cloned().unwrap_or_else(&*inner_value));

    let set_value = use_callback(move |x: T| {
        inner_value.set(x.clone());
        on_value.call(x);
    });

    (value, set_value)
}
