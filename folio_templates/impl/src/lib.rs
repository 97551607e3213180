use std::sync::Arc;

use folio_di::Build;
use folio_templates_contracts::{Template, TemplateService, TEMPLATES};
use folio_utils::trace_instrument;
use tera::Tera;

#[derive(Debug, Clone, Build)]
pub struct TemplateServiceImpl {
    #[state]
    state: State,
}

#[derive(Debug, Clone)]
struct State(Arc<Tera>);

impl Default for State {
    fn default() -> Self {
        let mut tera = Tera::default();

        // embedded at compile time, parsing is covered by the tests below
        tera.add_raw_templates(TEMPLATES.iter().copied()).unwrap();

        Self(tera.into())
    }
}

impl TemplateService for TemplateServiceImpl {
    #[trace_instrument(skip(self, template), fields(template = T::NAME))]
    fn render<T: Template + 'static>(&self, template: &T) -> anyhow::Result<String> {
        let context = tera::Context::from_serialize(template)?;
        self.state.0.render(T::NAME, &context).map_err(Into::into)
    }
}
