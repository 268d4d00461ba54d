use maud::{html, Markup, Render};

pub struct InputField {
    pub name: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub input_type: String,
    pub required: bool,
    pub autocomplete: Option<String>,
    pub error: Option<String>,
}

impl InputField {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            placeholder: None,
            value: None,
            input_type: "text".to_string(),
            required: false,
            autocomplete: None,
            error: None,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn input_type(mut self, input_type: &str) -> Self {
        self.input_type = input_type.to_string();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn autocomplete(mut self, autocomplete: &str) -> Self {
        self.autocomplete = Some(autocomplete.to_string());
        self
    }

    /// Show a validation message under the field
    pub fn error(mut self, error: Option<&str>) -> Self {
        self.error = error.map(str::to_string);
        self
    }
}

impl Render for InputField {
    fn render(&self) -> Markup {
        let border = if self.error.is_some() {
            "border-red-400 focus:ring-red-500 focus:border-red-500"
        } else {
            "border-gray-300 focus:ring-indigo-500 focus:border-indigo-500"
        };
        let error_id = format!("{}-error", self.name);

        html! {
            div class="mb-4" {
                @if let Some(label) = &self.label {
                    label for=(self.name) class="block text-sm font-medium text-gray-700 mb-1" { (label) }
                }

                input
                    type=(self.input_type)
                    name=(self.name)
                    id=(self.name)
                    value=(self.value.as_deref().unwrap_or(""))
                    placeholder=(self.placeholder.as_deref().unwrap_or(""))
                    autocomplete=[self.autocomplete.as_deref()]
                    aria-invalid=[self.error.as_ref().map(|_| "true")]
                    aria-describedby=[self.error.as_ref().map(|_| error_id.as_str())]
                    class={"w-full px-4 py-2 border rounded-lg focus:ring-2 text-gray-900 " (border)}
                    required[self.required];

                @if let Some(error) = &self.error {
                    p id=(error_id) class="mt-1 text-sm text-red-600" { (error) }
                }
            }
        }
    }
}

pub struct Form {
    pub action: String,
    pub method: String,
    pub content: Box<dyn Render>,
}

impl Form {
    pub fn new(action: &str, method: &str, content: impl Render + 'static) -> Self {
        Self {
            action: action.to_string(),
            method: method.to_string(),
            content: Box::new(content),
        }
    }
}

impl Render for Form {
    fn render(&self) -> Markup {
        html! {
            // Server-side validation is authoritative, browser checks are skipped
            form action=(self.action) method=(self.method) class="space-y-4" novalidate {
                (self.content.render())
            }
        }
    }
}
