mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gridslice_kit::grid::{StoreDataResolver, UserAction};
use gridslice_kit::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use cli::Cli;

/// Output of a `--submit` run
#[derive(Serialize)]
struct SubmitReport {
    element: Element,
    store: Value,
    actions: Vec<UserAction>,
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Seed the store from a `{scope: formData}` object
fn seed_store(store: &StoreHandle, data: Value) -> Result<()> {
    let Value::Object(scopes) = data else {
        bail!("store data must be a JSON object of scope name to form data");
    };
    for (scope, form_data) in scopes {
        store.set_form_data(&scope, form_data);
    }
    Ok(())
}

/// Every `onFinish` of a rendered form, in tree order
fn collect_submit_handlers(element: &Element, out: &mut Vec<Handler>) {
    if let Some(widget) = element.widget() {
        if widget.kind == WidgetKind::Form {
            if let Some(handler) = widget.props.handler("onFinish") {
                out.push(handler.clone());
            }
        }
    }
    for child in element.children() {
        collect_submit_handlers(child, out);
    }
}

fn print_json(value: &impl Serialize, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", out);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let tree = GridItem::from_value(read_json(&cli.tree)?)
        .with_context(|| format!("invalid grid tree in {}", cli.tree.display()))?;

    let config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            RenderConfig::from_json(&text).with_context(|| format!("invalid config in {}", path.display()))?
        }
        None => RenderConfig::default(),
    };

    let store = StoreHandle::default();
    if let Some(path) = &cli.data {
        seed_store(&store, read_json(path)?)?;
    }

    let value_stream: Option<Value> = cli
        .value_stream
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("--value-stream is not valid JSON")?;

    let services = RenderServices::new(store.clone())
        .with_data_resolver(StoreDataResolver::new(store.clone()).with_separator(config.scope_separator));
    let mut surface = GridSurface::new(Renderer::with_config(services, config));
    surface.set_root(tree);
    surface.set_value_stream(value_stream);

    let element = surface.render();
    log::info!("Rendered tree `{}`", surface.root().map(|r| r.id.as_str()).unwrap_or(""));

    if !cli.submit {
        return print_json(&element, cli.compact);
    }

    let mut handlers = Vec::new();
    collect_submit_handlers(&element, &mut handlers);
    log::info!("Submitting {} form(s)", handlers.len());
    for handler in &handlers {
        handler.call(None);
    }

    let report = SubmitReport {
        element,
        store: store.with(|s| s.to_json()),
        actions: surface.take_pending_actions(),
    };
    print_json(&report, cli.compact)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Cli::parse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_store() {
        let store = StoreHandle::default();
        seed_store(&store, json!({"profile": {"name": "Ada"}})).unwrap();
        assert_eq!(store.get_form_data("profile"), Some(json!({"name": "Ada"})));

        assert!(seed_store(&store, json!([1])).is_err());
    }

    #[test]
    fn test_collect_submit_handlers() {
        let renderer = Renderer::new(RenderServices::new(StoreHandle::default()));
        let tree = GridItem::new("page", "card")
            .with_child(GridItem::new("a$form", "form"))
            .with_child(GridItem::new("b$form", "form"));
        let element = renderer.render(&tree, None, None);

        let mut handlers = Vec::new();
        collect_submit_handlers(&element, &mut handlers);
        assert_eq!(handlers.len(), 2);

        for handler in &handlers {
            handler.call(None);
        }
        let keys = renderer.store().with(|s| s.keys());
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
