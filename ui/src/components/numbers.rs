use std::{fmt::Display, str::FromStr};

use dioxus::prelude::*;

use crate::components::text::TextInput;

/// A text input accepting numbers in `min..=max`.
///
/// `on_value` is called once the text is committed by leaving the input or pressing Enter. Text
/// that does not parse or falls outside the range marks the input invalid while typing, and is
/// replaced by the last accepted `value` when committed.
#[component]
pub fn NumberInput<T: 'static + Copy + PartialEq + PartialOrd + Display + FromStr>(
    value: T,
    on_value: Callback<T>,
    min: T,
    max: T,
    #[props(default)] suffix: Option<String>,
    #[props(default)] disabled: bool,
) -> Element {
    let mut text = use_signal(String::default);
    let mut invalid = use_signal(|| false);

    use_effect(use_reactive!(|value| {
        text.set(value.to_string());
        invalid.set(false);
    }));

    rsx! {
        div { class: "flex items-center gap-1",
            TextInput {
                class: "flex-grow",
                value: text(),
                invalid: invalid(),
                disabled,
                on_value: move |new_text: String| {
                    invalid.set(parse_in_range(&new_text, min, max).is_none());
                    text.set(new_text);
                },
                on_commit: move |committed: String| {
                    match parse_in_range(&committed, min, max) {
                        Some(number) if number != value => on_value(number),
                        Some(_) => {}
                        None => {
                            text.set(value.to_string());
                            invalid.set(false);
                        }
                    }
                },
            }
            if let Some(suffix) = suffix {
                span { class: "text-xxs text-secondary-text", {suffix} }
            }
        }
    }
}

fn parse_in_range<T: PartialOrd + FromStr>(text: &str, min: T, max: T) -> Option<T> {
    text.trim()
        .parse::<T>()
        .ok()
        .filter(|number| *number >= min && *number <= max)
}

/// [`NumberInput`] for durations in milliseconds.
#[component]
pub fn MillisInput(value: u64, on_value: Callback<u64>, min: u64, max: u64) -> Element {
    rsx! {
        NumberInput::<u64> {
            value,
            on_value,
            min,
            max,
            suffix: "ms".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_in_range_accepts_bounds() {
        assert_eq!(parse_in_range(" 100 ", 100_u64, 60_000), Some(100));
        assert_eq!(parse_in_range("60000", 100_u64, 60_000), Some(60_000));
        assert_eq!(parse_in_range("2.5", 0.0_f64, 1000.0), Some(2.5));
    }

    #[test]
    fn parse_in_range_rejects_partial_text() {
        assert_eq!(parse_in_range("", 100_u64, 60_000), None);
        assert_eq!(parse_in_range("1", 100_u64, 60_000), None);
        assert_eq!(parse_in_range("20ms", 100_u64, 60_000), None);
        assert_eq!(parse_in_range("-1", 0.0_f64, 1000.0), None);
    }
}
