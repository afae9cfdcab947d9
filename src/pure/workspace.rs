//! A virtual desktop: an ordered client list, a focus pointer and a layout.
use crate::{
    layout::{Layout, Message},
    Xid,
};

/// One of the fixed set of virtual desktops.
///
/// The client list order is the order seen by layouts (index 0 is master)
/// and is independent of the X stacking order. The focus pointer, when set,
/// always refers to a member of the list.
#[derive(Debug, Clone)]
pub struct Workspace {
    id: usize,
    name: String,
    clients: Vec<Xid>,
    focused: Option<Xid>,
    pub layout: Layout,
}

impl Workspace {
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            clients: Vec::new(),
            focused: None,
            layout: Layout::default(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn focused(&self) -> Option<Xid> {
        self.focused
    }

    pub fn clients(&self) -> impl Iterator<Item = &Xid> {
        self.clients.iter()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn contains(&self, id: Xid) -> bool {
        self.clients.contains(&id)
    }

    /// The first client in layout order, if any.
    pub fn first(&self) -> Option<Xid> {
        self.clients.first().copied()
    }

    /// The clients that should be passed to the layout, in list order.
    ///
    /// `is_floating` is supplied by the owner of the client records.
    pub fn tiled_clients<F>(&self, is_floating: F) -> Vec<Xid>
    where
        F: Fn(Xid) -> bool,
    {
        self.clients
            .iter()
            .copied()
            .filter(|&id| !is_floating(id))
            .collect()
    }

    /// Append a client to the end of the list without changing focus.
    pub fn add(&mut self, id: Xid) {
        if !self.clients.contains(&id) {
            self.clients.push(id);
        }
    }

    /// Remove a client from the list.
    ///
    /// If the removed client held focus, focus moves to the client now at
    /// the same index, falling back to the new last client, then to none.
    pub fn remove(&mut self, id: Xid) {
        let Some(ix) = self.clients.iter().position(|&c| c == id) else {
            return;
        };

        self.clients.remove(ix);

        if self.focused == Some(id) {
            self.focused = self
                .clients
                .get(ix)
                .or_else(|| self.clients.last())
                .copied();
        }
    }

    /// Point the focus at `id` if it is a member of this workspace.
    pub fn focus_client(&mut self, id: Xid) {
        if self.clients.contains(&id) {
            self.focused = Some(id);
        }
    }

    /// Cyclically advance focus; starts at the head when nothing is focused.
    pub fn focus_next(&mut self) -> Option<Xid> {
        if self.clients.is_empty() {
            return None;
        }

        let next = match self.focused_index() {
            Some(ix) => self.clients[(ix + 1) % self.clients.len()],
            None => self.clients[0],
        };
        self.focused = Some(next);

        self.focused
    }

    /// Cyclically step focus backwards; starts at the tail when nothing is
    /// focused.
    pub fn focus_prev(&mut self) -> Option<Xid> {
        if self.clients.is_empty() {
            return None;
        }

        let prev = match self.focused_index() {
            Some(0) | None => self.clients[self.clients.len() - 1],
            Some(ix) => self.clients[ix - 1],
        };
        self.focused = Some(prev);

        self.focused
    }

    /// Focus the master (first) client.
    pub fn focus_master(&mut self) -> Option<Xid> {
        if let Some(&first) = self.clients.first() {
            self.focused = Some(first);
        }

        self.focused
    }

    /// Swap the focused client with its successor in the list. The focused
    /// client keeps focus; only its position changes.
    pub fn swap_next(&mut self) {
        if let Some(ix) = self.swappable_index() {
            let next = (ix + 1) % self.clients.len();
            self.clients.swap(ix, next);
        }
    }

    /// Swap the focused client with its predecessor in the list.
    pub fn swap_prev(&mut self) {
        if let Some(ix) = self.swappable_index() {
            let prev = if ix == 0 { self.clients.len() - 1 } else { ix - 1 };
            self.clients.swap(ix, prev);
        }
    }

    /// Swap the focused client into the master position.
    pub fn swap_master(&mut self) {
        if let Some(ix) = self.swappable_index() {
            if ix != 0 {
                self.clients.swap(0, ix);
            }
        }
    }

    /// Rotate to the layout after the current one (by name) in `layouts`.
    ///
    /// Falls back to the first entry when the current layout is not in the
    /// rotation.
    pub fn next_layout(&mut self, layouts: &[Layout]) {
        if layouts.is_empty() {
            return;
        }

        self.layout = match layouts.iter().position(|l| l.name() == self.layout.name()) {
            Some(ix) => layouts[(ix + 1) % layouts.len()],
            None => layouts[0],
        };
    }

    pub fn handle_message(&mut self, m: Message) {
        self.layout.handle_message(m);
    }

    fn focused_index(&self) -> Option<usize> {
        self.focused
            .and_then(|id| self.clients.iter().position(|&c| c == id))
    }

    fn swappable_index(&self) -> Option<usize> {
        if self.clients.len() < 2 {
            return None;
        }

        self.focused_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn workspace_with(ids: &[u32], focused: Option<u32>) -> Workspace {
        let mut ws = Workspace::new(0, "1");
        for &id in ids {
            ws.add(Xid(id));
        }
        if let Some(id) = focused {
            ws.focus_client(Xid(id));
        }

        ws
    }

    #[test]
    fn add_does_not_change_focus() {
        let mut ws = workspace_with(&[1], Some(1));
        ws.add(Xid(2));

        assert_eq!(ws.focused(), Some(Xid(1)));
        assert_eq!(ws.len(), 2);
    }

    #[test_case(&[1, 2, 3], 2, Some(3); "middle focuses same index")]
    #[test_case(&[1, 2, 3], 3, Some(2); "tail focuses new last")]
    #[test_case(&[1], 1, None; "only client clears focus")]
    #[test]
    fn remove_focus_successor(ids: &[u32], removed: u32, expected: Option<u32>) {
        let mut ws = workspace_with(ids, Some(removed));
        ws.remove(Xid(removed));

        assert_eq!(ws.focused(), expected.map(Xid));
        assert!(!ws.contains(Xid(removed)));
    }

    #[test]
    fn remove_unfocused_keeps_focus() {
        let mut ws = workspace_with(&[1, 2, 3], Some(1));
        ws.remove(Xid(3));

        assert_eq!(ws.focused(), Some(Xid(1)));
    }

    #[test]
    fn focus_next_wraps() {
        let mut ws = workspace_with(&[1, 2], Some(2));

        assert_eq!(ws.focus_next(), Some(Xid(1)));
    }

    #[test]
    fn focus_next_from_none_starts_at_head() {
        let mut ws = workspace_with(&[1, 2, 3], None);

        assert_eq!(ws.focus_next(), Some(Xid(1)));
    }

    #[test]
    fn focus_prev_from_none_starts_at_tail() {
        let mut ws = workspace_with(&[1, 2, 3], None);

        assert_eq!(ws.focus_prev(), Some(Xid(3)));
    }

    #[test]
    fn focus_next_full_cycle_is_identity() {
        let mut ws = workspace_with(&[1, 2, 3, 4], Some(2));

        for _ in 0..ws.len() {
            ws.focus_next();
        }

        assert_eq!(ws.focused(), Some(Xid(2)));
    }

    #[test]
    fn swap_next_then_prev_is_identity() {
        let mut ws = workspace_with(&[1, 2, 3], Some(2));
        ws.swap_next();
        ws.swap_prev();

        let order: Vec<Xid> = ws.clients().copied().collect();
        assert_eq!(order, vec![Xid(1), Xid(2), Xid(3)]);
        assert_eq!(ws.focused(), Some(Xid(2)));
    }

    #[test]
    fn swap_next_moves_position_not_focus() {
        let mut ws = workspace_with(&[1, 2, 3], Some(2));
        ws.swap_next();

        let order: Vec<Xid> = ws.clients().copied().collect();
        assert_eq!(order, vec![Xid(1), Xid(3), Xid(2)]);
        assert_eq!(ws.focused(), Some(Xid(2)));
    }

    #[test]
    fn swap_master_moves_focused_to_head() {
        let mut ws = workspace_with(&[1, 2, 3], Some(3));
        ws.swap_master();

        let order: Vec<Xid> = ws.clients().copied().collect();
        assert_eq!(order, vec![Xid(3), Xid(2), Xid(1)]);
    }

    #[test]
    fn swaps_are_noops_without_focus_or_peers() {
        let mut ws = workspace_with(&[1], Some(1));
        ws.swap_next();
        ws.swap_master();

        assert_eq!(ws.clients().copied().collect::<Vec<_>>(), vec![Xid(1)]);

        let mut ws = workspace_with(&[1, 2], None);
        ws.swap_prev();
        assert_eq!(
            ws.clients().copied().collect::<Vec<_>>(),
            vec![Xid(1), Xid(2)]
        );
    }

    #[test]
    fn next_layout_rotates_and_wraps() {
        let layouts = Layout::all();
        let mut ws = Workspace::new(0, "1");

        assert_eq!(ws.layout.name(), "tall");

        for expected in ["full", "grid", "spiral", "threecol", "centered", "tall"] {
            ws.next_layout(&layouts);
            assert_eq!(ws.layout.name(), expected);
        }
    }

    #[test]
    fn tiled_clients_filters_floating() {
        let ws = workspace_with(&[1, 2, 3], None);
        let tiled = ws.tiled_clients(|id| id == Xid(2));

        assert_eq!(tiled, vec![Xid(1), Xid(3)]);
    }
}
