use dioxus::prelude::*;
use tw_merge::tw_merge;

const DIV_CLASS: &str = "flex flex-col gap-1";
const LABEL_CLASS: &str =
    "text-xxs text-secondary-text whitespace-nowrap overflow-hidden text-ellipsis";
const HINT_CLASS: &str = "text-xxs text-tertiary-text";

#[derive(Clone, PartialEq, Props)]
pub struct LabeledProps {
    label: String,
    children: Element,
    /// Shown under the input.
    #[props(default)]
    hint: Option<String>,
    #[props(default)]
    class: String,
}

#[component]
pub fn Labeled(props: LabeledProps) -> Element {
    let class = props.class;

    rsx! {
        div { class: tw_merge!(DIV_CLASS, class),
            label { class: LABEL_CLASS, {props.label} }
            {props.children}
            if let Some(hint) = props.hint {
                p { class: HINT_CLASS, {hint} }
            }
        }
    }
}
