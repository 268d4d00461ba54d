use maud::{html, Markup, Render};

/// The centered title and tagline every card page opens with
pub struct PageHeading {
    pub title: String,
    pub tagline: String,
}

impl PageHeading {
    pub fn new(title: impl Into<String>, tagline: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tagline: tagline.into(),
        }
    }
}

impl Render for PageHeading {
    fn render(&self) -> Markup {
        html! {
            h1 class="text-3xl font-bold mb-3 text-gray-800 text-center mt-4" { (self.title) }
            p class="text-gray-600 mb-6 text-center" { (self.tagline) }
        }
    }
}
