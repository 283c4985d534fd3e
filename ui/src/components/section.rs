use dioxus::prelude::*;

#[component]
pub fn Section(title: String, children: Element) -> Element {
    rsx! {
        div { class: "flex flex-col gap-2 pr-2 pb-3",
            p { class: "text-xs text-primary-text font-medium border-b border-primary-border pb-1",
                {title}
            }
            {children}
        }
    }
}
