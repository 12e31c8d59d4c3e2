//! Tera rendering of the starter project document.

use tera::Tera;

use crate::context::ScaffoldContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const DOCUMENT_TEMPLATE: &str = "ag_project.yml.tera";

const TPLS: &[(&str, &str)] = &[(
    DOCUMENT_TEMPLATE,
    include_str!("templates/ag_project.yml.tera"),
)];

fn build_tera() -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TPLS.iter().copied())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Tera-based renderer using embedded templates only.
///
/// Create once with [`Renderer::new`] and reuse.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer { tera: build_tera()? })
    }

    /// Render the starter `ag_project.yml` text for `ctx`.
    pub fn render_document(&self, ctx: &ScaffoldContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(DOCUMENT_TEMPLATE, &tera_ctx)?)
    }
}
