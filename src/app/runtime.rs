use std::{cell::Cell, rc::Rc};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::{
    document::{Accessor, Document},
    domain::{Type, TypeRegistry, type_to_string},
    editor::{
        Dispatcher, EditorError, EditorRegistry, EditorRow, EditorTree, RowWidget, UnionSelections,
        widgets,
    },
    io::output::to_indented_json,
    presentation::{self, UiContext},
};

use super::{
    input::{self, Command, KeyAction},
    keymap::{self, KeymapContext},
    options::UiOptions,
    params::SessionParams,
    popup::ChooserPopup,
    status::StatusLine,
    terminal::TerminalGuard,
    validation::{ValidationOutcome, validate_document},
};

/// Row to focus after the next rebuild.
enum FocusTarget {
    Row { accessor: Accessor, label: Option<String> },
    FirstAt(Accessor),
}

pub(crate) struct App {
    types: TypeRegistry,
    editors: EditorRegistry,
    root: Type,
    doc: Document,
    /// Set by the document observer, cleared by [`App::rebuild`].
    stale: Rc<Cell<bool>>,
    selections: UnionSelections,
    tree: EditorTree,
    mirror: String,
    options: UiOptions,
    params: SessionParams,
    title: String,
    status: StatusLine,
    focus: usize,
    popup: Option<ChooserPopup>,
    global_errors: Vec<String>,
    exit_armed: bool,
    should_quit: bool,
    result: Option<Value>,
}

impl App {
    pub fn new(
        types: TypeRegistry,
        editors: EditorRegistry,
        root: Type,
        value: Value,
        options: UiOptions,
    ) -> Result<Self> {
        let title = format!("Editing {}", type_to_string(&root));
        let mut doc = Document::new(value);
        let stale = Rc::new(Cell::new(false));
        let flag = Rc::clone(&stale);
        doc.subscribe(move |change| {
            trace!(path = %change.accessor, revision = change.revision, "editor tree stale");
            flag.set(true);
        });
        let mut app = Self {
            types,
            editors,
            root,
            doc,
            stale,
            selections: UnionSelections::new(),
            tree: EditorTree::default(),
            mirror: String::new(),
            options,
            params: SessionParams::new(),
            title,
            status: StatusLine::new(),
            focus: 0,
            popup: None,
            global_errors: Vec::new(),
            exit_armed: false,
            should_quit: false,
            result: None,
        };
        app.rebuild(None)?;
        Ok(app)
    }

    pub fn with_params(mut self, params: SessionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn run(&mut self) -> Result<Value> {
        let mut terminal = TerminalGuard::enter()?;
        info!(root = %type_to_string(&self.root), rows = self.tree.len(), "editor started");
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(self.options.tick_rate)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(key)?,
                Event::Resize(_, _) => {}
                Event::Mouse(_) => {}
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
        terminal.leave()?;

        self.result
            .take()
            .ok_or_else(|| anyhow!("user exited without saving"))
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let help = if self.options.show_help {
            keymap::help_text(&self.help_contexts())
        } else {
            None
        };
        let query = self.params.to_query_string();

        presentation::draw(
            frame,
            UiContext {
                title: &self.title,
                query: &query,
                rows: self.tree.rows(),
                focus: self.focus,
                mirror: self.options.show_mirror.then_some(self.mirror.as_str()),
                status_message: self.status.message(),
                dirty: self.is_dirty(),
                error_count: self.tree.error_count(),
                help: help.as_deref(),
                global_errors: &self.global_errors,
                popup: self.popup.as_ref().map(|popup| popup.as_render()),
            },
        );
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if self.popup.is_some() {
            return self.handle_popup_key(key);
        }

        let focus_before = self.focused_target();
        let outcome = match input::classify(&key) {
            Command::Action(action) => self.apply_action(action),
            Command::Input(key) => self.edit_focused(&key),
        };
        match outcome {
            Ok(target) => {
                if self.stale.get() {
                    self.rebuild(target.or(focus_before))?;
                }
            }
            Err(err) => {
                warn!("{err}");
                self.status.set_raw(err.to_string());
            }
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(popup) = &mut self.popup else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                self.popup = None;
                self.status.ready();
            }
            KeyCode::Up | KeyCode::BackTab => popup.select_previous(),
            KeyCode::Down | KeyCode::Tab => popup.select_next(),
            KeyCode::Enter => {
                let Some(popup) = self.popup.take() else {
                    return Ok(());
                };
                let target = self.focused_target();
                let switched = self.selections.switch_to(
                    &mut self.doc,
                    &self.types,
                    popup.accessor(),
                    popup.union(),
                    popup.selection(),
                    self.options.instantiate,
                );
                match switched {
                    Ok(()) => {
                        self.exit_armed = false;
                        self.status.switched(
                            &popup.accessor().to_string(),
                            popup.selected_name().unwrap_or_default(),
                        );
                        self.rebuild(target)?;
                    }
                    Err(err) => {
                        warn!("{err}");
                        self.status.set_raw(err.to_string());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Run a keymap action. Returns where focus should land when the
    /// document changed.
    fn apply_action(&mut self, action: KeyAction) -> Result<Option<FocusTarget>, EditorError> {
        match action {
            KeyAction::Save => {
                self.exit_armed = false;
                self.on_save()?;
            }
            KeyAction::Quit => self.on_exit(),
            KeyAction::ResetStatus => {
                self.exit_armed = false;
                self.global_errors.clear();
                self.status.ready();
            }
            KeyAction::FocusStep(delta) => {
                self.exit_armed = false;
                self.step_focus(delta);
            }
            KeyAction::OpenChooser => self.open_chooser(),
            KeyAction::AppendElement => return self.append_element(),
            KeyAction::RemoveElement => return self.remove_element(),
            KeyAction::GenerateGuid => {
                let Some(row) = self.tree.get(self.focus) else {
                    return Ok(None);
                };
                let guid = widgets::generate_guid(&mut self.doc, row)?;
                self.exit_armed = false;
                self.status.set_raw(format!("Generated {guid}"));
            }
            KeyAction::Input => {}
        }
        Ok(None)
    }

    fn edit_focused(&mut self, key: &KeyEvent) -> Result<Option<FocusTarget>, EditorError> {
        let Some(row) = self.tree.get(self.focus) else {
            return Ok(None);
        };
        if widgets::handle_key(&mut self.doc, row, key)? {
            self.exit_armed = false;
            self.status.editing(&row.title());
        }
        Ok(None)
    }

    fn open_chooser(&mut self) {
        let Some(row) = self.tree.get(self.focus) else {
            return;
        };
        if let RowWidget::Choice { union, selected } = &row.widget {
            self.popup = Some(ChooserPopup::new(
                row.accessor.clone(),
                union.clone(),
                row.title(),
                *selected,
            ));
            self.status.set_raw("Use ↑/↓ and Enter to choose");
        }
    }

    fn append_element(&mut self) -> Result<Option<FocusTarget>, EditorError> {
        let Some((array, ty)) = self.tree.owning_array(self.focus) else {
            return Err(EditorError::unsupported("append", self.focused_title()));
        };
        let (array, ty) = (array.clone(), ty.clone());
        let options = self.options.instantiate;
        let index = widgets::array::append(&mut self.doc, &self.types, &array, &ty, options)?;
        self.exit_armed = false;
        self.status.appended(&ty.of.to_string());
        Ok(Some(FocusTarget::FirstAt(array.element(index))))
    }

    fn remove_element(&mut self) -> Result<Option<FocusTarget>, EditorError> {
        let Some((array, index)) = self.tree.owning_element(self.focus) else {
            return Err(EditorError::unsupported("remove", self.focused_title()));
        };
        widgets::array::remove(&mut self.doc, &array, index)?;
        self.selections.forget_below(&array);
        self.exit_armed = false;
        self.status.removed(index + 1);
        let remaining = array
            .get(&self.doc)
            .ok()
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let target = if index < remaining {
            FocusTarget::FirstAt(array.element(index))
        } else {
            FocusTarget::Row {
                accessor: array,
                label: None,
            }
        };
        Ok(Some(target))
    }

    fn on_save(&mut self) -> Result<(), EditorError> {
        match validate_document(&self.types, &self.root, self.doc.value(), &self.tree)? {
            ValidationOutcome::Valid(value) => {
                info!(revision = self.doc.revision(), "document saved");
                self.global_errors.clear();
                self.status.set_raw("Document saved");
                self.result = Some(value);
                self.should_quit = true;
            }
            ValidationOutcome::Invalid { issues, messages } => {
                debug!(issues, "save blocked by validation");
                self.global_errors = messages;
                self.status.issues_remaining(issues);
            }
        }
        Ok(())
    }

    fn on_exit(&mut self) {
        if self.options.confirm_exit && self.is_dirty() && !self.exit_armed {
            self.exit_armed = true;
            self.status.pending_exit();
            return;
        }
        self.should_quit = true;
        self.result = None;
    }

    fn step_focus(&mut self, delta: i32) {
        let len = self.tree.len();
        if len == 0 {
            return;
        }
        let len = len as i64;
        let next = (self.focus as i64 + i64::from(delta)).rem_euclid(len);
        self.focus = next as usize;
    }

    fn rebuild(&mut self, target: Option<FocusTarget>) -> Result<()> {
        self.tree = EditorTree::build(
            &mut self.doc,
            Dispatcher::new(&self.types, &self.editors),
            &mut self.selections,
            &self.root,
        )
        .context("failed to build the editor tree")?;
        self.stale.set(false);
        self.mirror = to_indented_json(self.doc.value())?;
        let restored = target.and_then(|target| match target {
            FocusTarget::Row { accessor, label } => self.tree.find(&accessor, label.as_deref()),
            FocusTarget::FirstAt(accessor) => self
                .tree
                .rows()
                .iter()
                .position(|row| row.accessor == accessor),
        });
        self.focus = restored.unwrap_or(self.focus).min(self.tree.len().saturating_sub(1));
        debug!(
            revision = self.tree.revision(),
            rows = self.tree.len(),
            focus = self.focus,
            "editor tree rebuilt"
        );
        Ok(())
    }

    fn focused_target(&self) -> Option<FocusTarget> {
        self.focused_row().map(|row| FocusTarget::Row {
            accessor: row.accessor.clone(),
            label: row.label.clone(),
        })
    }

    fn focused_row(&self) -> Option<&EditorRow> {
        self.tree.get(self.focus)
    }

    fn focused_title(&self) -> String {
        self.focused_row()
            .map(EditorRow::title)
            .unwrap_or_else(|| "<nothing>".to_string())
    }

    fn help_contexts(&self) -> Vec<KeymapContext> {
        let mut contexts = vec![KeymapContext::Default];
        let Some(row) = self.focused_row() else {
            return contexts;
        };
        match row.widget {
            RowWidget::Choice { .. } => contexts.push(KeymapContext::Union),
            RowWidget::Guid => contexts.push(KeymapContext::Guid),
            RowWidget::Temporal(_) | RowWidget::Color => contexts.push(KeymapContext::Stepper),
            _ => {}
        }
        if self.tree.owning_array(self.focus).is_some() {
            contexts.push(KeymapContext::Array);
        }
        if self.tree.owning_element(self.focus).is_some() {
            contexts.push(KeymapContext::Element);
        }
        contexts
    }

    fn is_dirty(&self) -> bool {
        self.doc.revision() > 0
    }
}
