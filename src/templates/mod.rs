use crate::actors::workbench::Snapshot;
use crate::static_assets;
use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;

static DASHBOARD_TEMPLATE: &str = include_str!("dashboard.html");

static JINJA_ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("dashboard.html", DASHBOARD_TEMPLATE)
        .unwrap();
    env
});

#[derive(Serialize)]
struct ParameterField<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct FunctionCard<'a> {
    name: &'a str,
    path_template: &'a str,
    parameters: Vec<ParameterField<'a>>,
    result: Option<&'a str>,
}

/// One card per function, one input per distinct parameter name.
fn function_cards(snapshot: &Snapshot) -> Vec<FunctionCard<'_>> {
    snapshot
        .functions
        .iter()
        .map(|func| FunctionCard {
            name: &func.name,
            path_template: &func.path_template,
            parameters: func
                .distinct_parameters()
                .into_iter()
                .map(|name| ParameterField {
                    name,
                    value: snapshot.inputs.value(&func.name, name),
                })
                .collect(),
            result: snapshot.results.get(&func.name),
        })
        .collect()
}

pub fn render_dashboard(snapshot: &Snapshot, backend: &str) -> Result<String, minijinja::Error> {
    let tmpl = JINJA_ENV.get_template("dashboard.html")?;
    tmpl.render(minijinja::context! {
        backend => backend,
        status => snapshot.status,
        functions => function_cards(snapshot),
        scripts => static_assets::get_script_tags(),
    })
}

pub fn render_production_error() -> String {
    "<h1>Internal Server Error</h1><p>The workbench could not render this page.</p>".to_string()
}
