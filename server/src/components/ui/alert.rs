use maud::{html, Markup, Render};

/// An error banner shown above a form
pub struct Alert {
    pub message: String,
}

impl Alert {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Render for Alert {
    fn render(&self) -> Markup {
        html! {
            div role="alert" class="mb-4 px-4 py-3 rounded-lg border text-sm bg-red-50 border-red-200 text-red-700" {
                (self.message)
            }
        }
    }
}
