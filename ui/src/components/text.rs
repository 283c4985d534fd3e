use dioxus::prelude::*;
use tw_merge::tw_merge;

use crate::components::use_controlled;

const DIV_CLASS: &str = "inline-block h-6 text-xs text-primary-text px-1 border border-primary-border data-[invalid=true]:border-danger-border";
const INPUT_CLASS: &str =
    "outline-none disabled:cursor-not-allowed size-full whitespace-nowrap text-ellipsis";

#[derive(Props, PartialEq, Clone)]
pub struct TextInputProps {
    value: ReadSignal<Option<String>>,
    #[props(default)]
    on_value: Callback<String>,
    /// Called with the current text when the input loses focus or Enter is pressed.
    #[props(default)]
    on_commit: Callback<String>,
    #[props(default)]
    invalid: ReadSignal<bool>,
    #[props(default)]
    disabled: ReadSignal<bool>,
    #[props(default)]
    placeholder: Option<String>,
    #[props(default)]
    class: String,
}

#[component]
pub fn TextInput(props: TextInputProps) -> Element {
    let placeholder = props.placeholder;
    let disabled = props.disabled;
    let on_commit = props.on_commit;
    let class = props.class;
    let (value, set_value) = use_controlled(props.value, String::default(), props.on_value);

    rsx! {
        div { class: tw_merge!(DIV_CLASS, class), "data-invalid": props.invalid,
            input {
                class: INPUT_CLASS,
                disabled,
                placeholder,
                r#type: "text",
                spellcheck: false,
                oninput: move |e| {
                    set_value(e.value());
                },
                onchange: move |e| {
                    on_commit(e.value());
                },
                value,
            }
        }
    }
}
