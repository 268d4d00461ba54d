use maud::{html, Markup, Render};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonVariant {
    Primary,
    Secondary,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonSize {
    Medium,
    Large,
}

pub struct Button {
    pub text: String,
    pub href: Option<String>,
    pub variant: ButtonVariant,
    pub size: ButtonSize,
    pub full_width: bool,
    pub button_type: Option<String>,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            text: String::new(),
            href: None,
            variant: ButtonVariant::Primary,
            size: ButtonSize::Medium,
            full_width: false,
            button_type: None,
        }
    }
}

impl Button {
    pub fn primary(text: &str) -> Self {
        Self {
            text: text.to_string(),
            variant: ButtonVariant::Primary,
            ..Default::default()
        }
    }

    pub fn secondary(text: &str) -> Self {
        Self {
            text: text.to_string(),
            variant: ButtonVariant::Secondary,
            ..Default::default()
        }
    }

    pub fn link(text: &str) -> Self {
        Self {
            text: text.to_string(),
            variant: ButtonVariant::Link,
            ..Default::default()
        }
    }

    pub fn href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn size(mut self, size: ButtonSize) -> Self {
        self.size = size;
        self
    }

    pub fn full_width(mut self, full_width: bool) -> Self {
        self.full_width = full_width;
        self
    }

    pub fn button_type(mut self, button_type: &str) -> Self {
        self.button_type = Some(button_type.to_string());
        self
    }

    fn get_variant_classes(&self) -> &'static str {
        match self.variant {
            ButtonVariant::Primary => "bg-indigo-600 hover:bg-indigo-700 active:bg-indigo-800 text-white focus:ring-2 focus:ring-indigo-500 focus:ring-offset-2 shadow-sm hover:shadow",
            ButtonVariant::Secondary => "bg-white hover:bg-gray-50 active:bg-gray-100 text-indigo-600 border border-indigo-300 hover:border-indigo-400 focus:ring-2 focus:ring-indigo-500 focus:ring-offset-2 shadow-sm hover:shadow",
            ButtonVariant::Link => "bg-transparent text-indigo-600 hover:text-indigo-800 active:text-indigo-900 hover:underline focus:outline-none focus:underline",
        }
    }

    fn get_size_classes(&self) -> &'static str {
        match self.size {
            ButtonSize::Medium => "py-2 sm:py-2.5 px-3 sm:px-4 text-sm sm:text-base",
            ButtonSize::Large => "py-2.5 sm:py-3 px-4 sm:px-6 text-base sm:text-lg",
        }
    }
}

impl Render for Button {
    fn render(&self) -> Markup {
        let width_class = if self.full_width { "w-full" } else { "" };

        let classes = format!(
            "{} {} {} font-medium rounded-lg transition-all duration-200 flex items-center justify-center cursor-pointer",
            self.get_variant_classes(),
            self.get_size_classes(),
            width_class,
        );

        if let Some(href) = &self.href {
            html! {
                a href=(href) class=(classes) { (self.text) }
            }
        } else {
            let button_type = self.button_type.as_deref().unwrap_or("button");

            html! {
                button type=(button_type) class=(classes) { (self.text) }
            }
        }
    }
}
