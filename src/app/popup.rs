use crate::{
    document::Accessor,
    domain::{UnionType, type_to_string},
    presentation::PopupRender,
};

/// Alternative picker opened on a union's choice row.
pub(crate) struct ChooserPopup {
    accessor: Accessor,
    union: UnionType,
    title: String,
    options: Vec<String>,
    selected: usize,
}

impl ChooserPopup {
    pub(crate) fn new(
        accessor: Accessor,
        union: UnionType,
        title: String,
        selected: usize,
    ) -> Self {
        let options = union.alternatives.iter().map(type_to_string).collect();
        Self {
            accessor,
            union,
            title,
            options,
            selected,
        }
    }

    pub(crate) fn select_previous(&mut self) {
        if self.options.is_empty() {
            return;
        }
        if self.selected == 0 {
            self.selected = self.options.len().saturating_sub(1);
        } else {
            self.selected -= 1;
        }
    }

    pub(crate) fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.options.len();
    }

    pub(crate) fn selection(&self) -> usize {
        self.selected
    }

    pub(crate) fn selected_name(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }

    pub(crate) fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    pub(crate) fn union(&self) -> &UnionType {
        &self.union
    }

    pub(crate) fn as_render(&self) -> PopupRender<'_> {
        PopupRender {
            title: &self.title,
            options: &self.options,
            selected: self.selected,
        }
    }
}
