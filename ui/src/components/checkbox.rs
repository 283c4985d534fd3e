use dioxus::prelude::*;

const LABEL_CLASS: &str = "inline-flex items-center gap-2 h-6 text-xs text-primary-text data-[disabled=false]:cursor-pointer data-[disabled=true]:cursor-not-allowed data-[disabled=true]:text-tertiary-text";
const INPUT_CLASS: &str = "appearance-none size-4 border border-primary-border checked:bg-active-surface disabled:cursor-not-allowed";

/// A checkbox with its text beside it, both toggling `checked`.
#[component]
pub fn Checkbox(
    text: String,
    checked: bool,
    on_checked: Callback<bool>,
    #[props(default)] disabled: bool,
) -> Element {
    rsx! {
        label { class: LABEL_CLASS, "data-disabled": disabled,
            input {
                class: INPUT_CLASS,
                r#type: "checkbox",
                disabled,
                checked,
                onchange: move |e: FormEvent| {
                    on_checked(e.checked());
                },
            }
            span { {text} }
        }
    }
}
