//! Static HTML: the landing page (tera, autoescaped) and the Swagger UI shell.

use tera::{Context, Tera};

use crate::config::ServiceConfig;

const INDEX_TEMPLATE: &str = include_str!("index.html");

/// Swagger UI page; the explorer loads `/openapi`.
pub const SWAGGER_HTML: &str = include_str!("swagger.html");

/// Templates compiled once at startup.
#[derive(Debug)]
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render_index(&self, cfg: &ServiceConfig) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("message", &cfg.ui_message);
        ctx.insert("color", &cfg.ui_color);
        ctx.insert("version", &cfg.version);
        ctx.insert("commit", &cfg.commit);
        ctx.insert("commit_short", &cfg.commit_short);
        ctx.insert("build_date", &cfg.build_date);
        self.tera.render("index.html", &ctx)
    }
}
