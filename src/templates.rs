use anyhow::Context;
use once_cell::sync::Lazy;
use tera::Tera;

static TEMPLATES: Lazy<Tera> =
    Lazy::new(|| Tera::new("views/**/*").expect("Failed to initialize Tera templates"));

pub fn render(template_name: &str, ctx: &tera::Context) -> Result<String, anyhow::Error> {
    TEMPLATES
        .render(template_name, ctx)
        .with_context(|| format!("Failed rendering template {template_name}"))
}
