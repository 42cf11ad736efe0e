use dioxus::prelude::*;

#[component]
pub fn LoginView() -> Element {
    rsx! {
        div { class: "page login",
            h2 { "Sign in" }
            p { "Sign in with your school account to see your pathway progress." }
            p { class: "muted",
                "On this device, run "
                code { "pathway sign-in --student <id>" }
                " and reopen the app."
            }
        }
    }
}
