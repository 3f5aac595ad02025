use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::info;

use crate::{
    domain::{SAMPLE_SOURCE, TYPE_TAG, Type, TypeRegistry, sample_document},
    editor::EditorRegistry,
    io::{
        self,
        output::{OutputOptions, emit},
    },
};

use super::{options::UiOptions, params::SessionParams, runtime::App};

/// Value and root type the editor starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub value: Value,
    pub root: Type,
    pub params: SessionParams,
}

/// Entry point: a typed JSON document edited in the terminal.
#[derive(Debug)]
pub struct TymlUI {
    types: TypeRegistry,
    editors: EditorRegistry,
    value: Option<Value>,
    root: Option<Type>,
    params: SessionParams,
    title: Option<String>,
    options: UiOptions,
    output: Option<OutputOptions>,
}

impl TymlUI {
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            editors: EditorRegistry::default(),
            value: None,
            root: None,
            params: SessionParams::new(),
            title: None,
            options: UiOptions::default(),
            output: None,
        }
    }

    /// Edit this value instead of loading one from the session parameters.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// `source` names a document to load, `type` a type to edit.
    pub fn with_params(mut self, params: SessionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_root_type(mut self, root: Type) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_editors(mut self, editors: EditorRegistry) -> Self {
        self.editors = editors;
        self
    }

    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = Some(output);
        self
    }

    /// Work out the starting value and root type.
    ///
    /// An explicit value wins, then the `source` parameter, then an instance
    /// of the `type` parameter. With none of them the bundled fstab sample is
    /// loaded and advertised as the `source`.
    pub fn session(&self) -> Result<Session> {
        let mut params = self.params.clone();
        let value = match (&self.value, params.get("source"), params.get("type")) {
            (Some(value), _, _) => value.clone(),
            (None, Some(source), _) => load_source(source)?,
            (None, None, Some(name)) => self
                .types
                .instantiate(&Type::named(name))
                .with_context(|| format!("failed to instantiate {name}"))?,
            (None, None, None) => {
                params.set("source", SAMPLE_SOURCE);
                sample_document()
            }
        };
        let root = match (&self.root, params.get("type")) {
            (Some(root), _) => root.clone(),
            (None, Some(name)) => Type::named(name),
            (None, None) => value
                .get(TYPE_TAG)
                .and_then(Value::as_str)
                .map(Type::named)
                .ok_or_else(|| anyhow!("the document has no {TYPE_TAG} tag; name its type"))?,
        };
        self.types
            .resolve(&root)
            .with_context(|| format!("cannot edit {root}"))?;
        Ok(Session {
            value,
            root,
            params,
        })
    }

    /// Run the editor until the user saves or quits. The saved document is
    /// written to the configured outputs before it is returned.
    pub fn run(self) -> Result<Value> {
        let Session {
            value,
            root,
            params,
        } = self.session()?;
        info!(root = %root, params = %params, "starting editor");
        let mut app = App::new(self.types, self.editors, root, value, self.options)?
            .with_params(params);
        if let Some(title) = self.title {
            app = app.with_title(title);
        }
        let value = app.run()?;
        if let Some(output) = &self.output {
            emit(&value, output)?;
        }
        Ok(value)
    }
}

fn load_source(source: &str) -> Result<Value> {
    if source == SAMPLE_SOURCE {
        return Ok(sample_document());
    }
    io::input::read_document(Path::new(source))
}
