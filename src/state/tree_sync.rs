use crate::models::Severity;
use crate::state::AppContext;
use crate::tree::{FolderTree, Mutation, MutationGate, TreeOp};
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PendingToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PendingState {
    AwaitingServer,
    /// Server agreed; one replay of the op may pass the gate.
    Confirmed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PendingOp {
    pub token: PendingToken,
    pub op: TreeOp,
    pub state: PendingState,
}

/// Gate between the folder tree and the server.
///
/// A mutation the tree asks for is denied and turned into a server request.
/// Once the server confirms, the same op is queued as a pre-approval and the
/// caller replays it; the gate lets exactly that op through once.
#[derive(Debug, Default)]
pub(crate) struct TreeMutator {
    next_token: u64,
    pending: Vec<PendingOp>,
    /// Tokens whose server request has not been dispatched yet.
    outbox: VecDeque<PendingToken>,
}

impl TreeMutator {
    pub fn new() -> Self {
        Self::default()
    }

    fn open(&mut self, op: &TreeOp) -> PendingToken {
        self.next_token += 1;
        let token = PendingToken(self.next_token);
        self.pending.push(PendingOp {
            token,
            op: op.clone(),
            state: PendingState::AwaitingServer,
        });
        self.outbox.push_back(token);
        token
    }

    /// Requests produced by denied mutations, oldest first.
    pub fn take_requests(&mut self) -> Vec<(PendingToken, TreeOp)> {
        let tokens: Vec<PendingToken> = self.outbox.drain(..).collect();
        tokens
            .into_iter()
            .filter_map(|t| self.get(t).map(|p| (t, p.op.clone())))
            .collect()
    }

    pub fn get(&self, token: PendingToken) -> Option<&PendingOp> {
        self.pending.iter().find(|p| p.token == token)
    }

    /// Server accepted the op: queue one pre-approval and hand back the op to
    /// replay. `None` for unknown or already-confirmed tokens.
    pub fn confirm(&mut self, token: PendingToken) -> Option<TreeOp> {
        let p = self
            .pending
            .iter_mut()
            .find(|p| p.token == token && p.state == PendingState::AwaitingServer)?;
        p.state = PendingState::Confirmed;
        Some(p.op.clone())
    }

    /// Server refused the op. The tree was never touched, so nothing to undo.
    pub fn reject(&mut self, token: PendingToken) -> bool {
        let Some(pos) = self
            .pending
            .iter()
            .position(|p| p.token == token && p.state == PendingState::AwaitingServer)
        else {
            return false;
        };
        self.pending.remove(pos);
        self.outbox.retain(|t| *t != token);
        true
    }

    /// Drop the pre-approval of `token` if its replay did not consume it.
    ///
    /// Returns true when an unused approval was discarded.
    pub fn settle(&mut self, token: PendingToken) -> bool {
        let Some(pos) = self
            .pending
            .iter()
            .position(|p| p.token == token && p.state == PendingState::Confirmed)
        else {
            return false;
        };
        self.pending.remove(pos);
        true
    }

    /// Confirmed ops waiting for their replay.
    pub fn pre_approved(&self) -> usize {
        self.pending
            .iter()
            .filter(|p| p.state == PendingState::Confirmed)
            .count()
    }

    pub fn awaiting_server(&self) -> usize {
        self.pending
            .iter()
            .filter(|p| p.state == PendingState::AwaitingServer)
            .count()
    }
}

impl MutationGate for TreeMutator {
    fn check(&mut self, op: &TreeOp) -> bool {
        if let Some(pos) = self
            .pending
            .iter()
            .position(|p| p.state == PendingState::Confirmed && p.op.same_target(op))
        {
            self.pending.remove(pos);
            return true;
        }

        // Drag and drop reports spurious moves onto the current parent.
        if op.is_same_parent_move() {
            return false;
        }

        self.open(op);
        false
    }
}

/// Runs tree mutations through the server before they show up locally.
#[derive(Clone)]
pub(crate) struct TreeSyncController {
    app_state: AppContext,
    tree: RwSignal<FolderTree>,
    mutator: Arc<Mutex<TreeMutator>>,
}

impl TreeSyncController {
    pub fn new(app_state: AppContext, tree: RwSignal<FolderTree>) -> Self {
        Self {
            app_state,
            tree,
            mutator: Arc::new(Mutex::new(TreeMutator::new())),
        }
    }

    pub fn tree(&self) -> RwSignal<FolderTree> {
        self.tree
    }

    pub fn rename(&self, node: &str, name: &str) {
        self.request(TreeOp::Rename {
            node: node.to_string(),
            name: name.to_string(),
        });
    }

    pub fn move_to(&self, node: &str, new_parent: &str) {
        self.request(TreeOp::Move {
            node: node.to_string(),
            old_parent: None,
            new_parent: new_parent.to_string(),
        });
    }

    /// Tree delete path; no confirmation prompt here.
    pub fn delete(&self, node: &str) {
        self.request(TreeOp::Delete {
            node: node.to_string(),
        });
    }

    fn apply(&self, op: &TreeOp) -> Option<Result<Mutation, crate::tree::TreeError>> {
        let mutator = self.mutator.clone();
        self.tree.try_update(move |t| match mutator.lock() {
            Ok(mut m) => Some(t.request(op, &mut *m)),
            Err(_) => None,
        })?
    }

    fn request(&self, op: TreeOp) {
        if let Some(Err(e)) = self.apply(&op) {
            warn!("{} on folder {} refused: {}", op.kind(), op.node(), e);
            self.app_state.inform_user(e.to_string(), Severity::Warning);
            return;
        }
        self.dispatch();
    }

    fn dispatch(&self) {
        let requests = match self.mutator.lock() {
            Ok(mut m) => m.take_requests(),
            Err(_) => return,
        };

        for (token, op) in requests {
            let api_client = self.app_state.0.api_client.get_untracked();
            let s2 = self.clone();
            spawn_local(async move {
                log!("{} on folder {}: waiting for server", op.kind(), op.node());
                match api_client.perform(&op).await {
                    Ok(()) => s2.on_confirmed(token),
                    Err(e) => {
                        warn!("{} on folder {} failed: {}", op.kind(), op.node(), e);
                        if let Ok(mut m) = s2.mutator.lock() {
                            m.reject(token);
                        }
                        s2.app_state.inform_user(e.user_message(), Severity::Danger);
                    }
                }
            });
        }
    }

    fn on_confirmed(&self, token: PendingToken) {
        let op = match self.mutator.lock() {
            Ok(mut m) => m.confirm(token),
            Err(_) => None,
        };
        let Some(op) = op else {
            return;
        };

        let applied = matches!(self.apply(&op), Some(Ok(Mutation::Applied)));
        if applied && matches!(op, TreeOp::Delete { .. }) {
            self.tree.update(|t| {
                t.select_node(None);
            });
        }

        let leaked = self
            .mutator
            .lock()
            .map(|mut m| m.settle(token))
            .unwrap_or(false);
        if leaked {
            warn!(
                "{} on folder {} was confirmed but no longer applies locally",
                op.kind(),
                op.node()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::sample_tree;

    fn names_under(t: &FolderTree, parent: &str) -> Vec<String> {
        t.children(Some(parent)).iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn test_rename_confirmed_applies_exactly_once() {
        let mut tree = sample_tree();
        let mut m = TreeMutator::new();

        assert_eq!(tree.rename_node("3", "X", &mut m), Ok(Mutation::Suspended));
        assert_eq!(tree.get("3").map(|n| n.name.as_str()), Some("Cases"));

        let reqs = m.take_requests();
        assert_eq!(reqs.len(), 1);
        let (token, op) = reqs[0].clone();
        assert_eq!(m.awaiting_server(), 1);

        let replay = m.confirm(token).expect("awaiting op should confirm");
        assert_eq!(replay, op);
        assert_eq!(m.pre_approved(), 1);

        assert_eq!(tree.request(&replay, &mut m), Ok(Mutation::Applied));
        assert_eq!(tree.get("3").map(|n| n.name.as_str()), Some("X"));
        assert_eq!(m.pre_approved(), 0);
        assert!(!m.settle(token));

        // The replay did not produce another request.
        assert!(m.take_requests().is_empty());
        assert_eq!(m.awaiting_server(), 0);
    }

    #[test]
    fn test_delete_rejected_leaves_node() {
        let mut tree = sample_tree();
        let mut m = TreeMutator::new();

        assert_eq!(tree.delete_node("7", &mut m), Ok(Mutation::Suspended));
        let (token, _) = m.take_requests()[0].clone();

        assert!(m.reject(token));
        assert!(tree.get("7").is_some());
        assert!(tree.get("8").is_some());
        assert_eq!(m.pre_approved(), 0);
        assert_eq!(m.awaiting_server(), 0);

        // Nothing left to confirm.
        assert!(m.confirm(token).is_none());
    }

    #[test]
    fn test_same_parent_move_issues_no_request() {
        let mut tree = sample_tree();
        let mut m = TreeMutator::new();

        assert_eq!(tree.move_node("3", "1", &mut m), Ok(Mutation::Suspended));
        assert!(m.take_requests().is_empty());
        assert_eq!(m.awaiting_server(), 0);
    }

    #[test]
    fn test_drag_folder_onto_other_folder() {
        let mut tree = sample_tree();
        let mut m = TreeMutator::new();

        assert_eq!(tree.move_node("7", "3", &mut m), Ok(Mutation::Suspended));
        let reqs = m.take_requests();
        assert_eq!(
            reqs.iter().map(|(_, op)| op.clone()).collect::<Vec<_>>(),
            vec![TreeOp::Move {
                node: "7".to_string(),
                old_parent: Some("1".to_string()),
                new_parent: "3".to_string(),
            }]
        );
        let (token, _) = reqs[0].clone();

        let replay = m.confirm(token).expect("confirm");
        assert_eq!(m.pre_approved(), 1);
        assert_eq!(tree.request(&replay, &mut m), Ok(Mutation::Applied));
        assert_eq!(m.pre_approved(), 0);

        assert_eq!(names_under(&tree, "3"), vec!["7".to_string()]);
        assert_eq!(names_under(&tree, "1"), vec!["3".to_string()]);
    }

    #[test]
    fn test_overlapping_ops_confirmed_out_of_order() {
        let mut tree = sample_tree();
        let mut m = TreeMutator::new();

        let _ = tree.rename_node("3", "Briefs", &mut m);
        let _ = tree.rename_node("8", "Archive", &mut m);
        let reqs = m.take_requests();
        assert_eq!(reqs.len(), 2);
        let (first, _) = reqs[0].clone();
        let (second, _) = reqs[1].clone();

        // Second answer arrives first.
        let replay = m.confirm(second).expect("confirm second");
        assert_eq!(tree.request(&replay, &mut m), Ok(Mutation::Applied));
        assert_eq!(tree.get("8").map(|n| n.name.as_str()), Some("Archive"));
        assert_eq!(tree.get("3").map(|n| n.name.as_str()), Some("Cases"));

        let replay = m.confirm(first).expect("confirm first");
        assert_eq!(tree.request(&replay, &mut m), Ok(Mutation::Applied));
        assert_eq!(tree.get("3").map(|n| n.name.as_str()), Some("Briefs"));

        assert_eq!(m.pre_approved(), 0);
        assert!(m.take_requests().is_empty());
    }

    #[test]
    fn test_approval_is_not_consumed_by_a_different_op() {
        let mut tree = sample_tree();
        let mut m = TreeMutator::new();

        let _ = tree.rename_node("3", "Briefs", &mut m);
        let (token, _) = m.take_requests()[0].clone();
        assert!(m.confirm(token).is_some());

        // An unrelated user rename reaches the gate before the replay.
        assert_eq!(tree.rename_node("8", "Archive", &mut m), Ok(Mutation::Suspended));
        assert_eq!(tree.get("8").map(|n| n.name.as_str()), Some("Old"));
        assert_eq!(m.pre_approved(), 1);
        assert_eq!(m.take_requests().len(), 1);
    }

    #[test]
    fn test_replay_that_no_longer_applies_is_settled() {
        let mut tree = sample_tree();
        let mut m = TreeMutator::new();

        let _ = tree.rename_node("8", "Archive", &mut m);
        let (token, _) = m.take_requests()[0].clone();
        let replay = m.confirm(token).expect("confirm");

        // Folder vanished while the request was in flight.
        let _ = tree.delete_node("7", &mut m);
        let (del, _) = m.take_requests()[0].clone();
        let del_replay = m.confirm(del).expect("confirm delete");
        assert_eq!(tree.request(&del_replay, &mut m), Ok(Mutation::Applied));

        assert!(tree.request(&replay, &mut m).is_err());
        assert_eq!(m.pre_approved(), 1);
        assert!(m.settle(token));
        assert_eq!(m.pre_approved(), 0);
    }

    #[test]
    fn test_confirm_twice_is_ignored() {
        let mut tree = sample_tree();
        let mut m = TreeMutator::new();

        let _ = tree.delete_node("3", &mut m);
        let (token, _) = m.take_requests()[0].clone();
        assert!(m.confirm(token).is_some());
        assert!(m.confirm(token).is_none());
        assert!(!m.reject(token));
        assert_eq!(m.pre_approved(), 1);
    }
}
