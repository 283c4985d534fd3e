use dioxus::prelude::*;
use tw_merge::tw_merge;

const CLASS: &str = "inline-block h-8 text-xs text-center font-medium content-center px-3 select-none bg-secondary-surface data-[disabled=false]:hover:bg-tertiary-surface data-[disabled=false]:cursor-pointer data-[disabled=true]:cursor-not-allowed data-[disabled=true]:text-tertiary-text";

#[derive(Copy, Clone, PartialEq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Danger,
}

#[derive(Props, Clone, PartialEq)]
pub struct ButtonProps {
    #[props(default)]
    on_click: Callback,
    #[props(default)]
    disabled: ReadSignal<bool>,
    /// Highlights the button as a toggle that is currently on.
    #[props(default)]
    active: ReadSignal<bool>,
    #[props(default = ButtonStyle::Primary)]
    style: ButtonStyle,
    #[props(default)]
    class: String,
    children: Element,
}

#[component]
pub fn Button(props: ButtonProps) -> Element {
    let class = props.class;
    let disabled = props.disabled;
    let text_class = match props.style {
        ButtonStyle::Primary => "text-primary-text",
        ButtonStyle::Secondary => "text-secondary-text",
        ButtonStyle::Danger => "text-danger-text",
    };
    let active_class = if (props.active)() {
        "border border-active-border"
    } else {
        ""
    };

    rsx! {
        div {
            role: "button",
            class: tw_merge!(CLASS, text_class, active_class, class),
            "data-disabled": disabled,
            onclick: move |_| {
                if !disabled() {
                    props.on_click.call(());
                }
            },
            {props.children}
        }
    }
}
