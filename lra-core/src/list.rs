//! An explicit, arena-backed doubly-linked instruction list.
//!
//! The system this allocator is modeled on has a "reverse-walk
//! insertion" trick — mutating the work-list node's data pointer in
//! place so the next iteration doesn't skip a newly inserted
//! instruction — that's deliberately not reproduced here. This module
//! is the replacement: a plain
//! arena of nodes linked by index, with `insert_before`/`insert_after`
//! splicing new nodes into the `prev`/`next` chain without touching the
//! reverse pass's traversal order at all. The reverse pass instead walks
//! a `Vec<NodeId>` recorded once, up front, by the forward pass (see
//! `liveness::collect`); instructions synthesized during the reverse
//! pass are spliced into this list but never appended to that recorded
//! order, so they are never themselves re-visited by a later phase.

use lra_isa::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

struct Node {
    inst: Instruction,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// A mutable instruction stream. The original block is loaded with
/// [`InstrList::from_instructions`]; after allocation, [`InstrList::head`]
/// may no longer be the node that was first in the input, since C5 is
/// permitted to insert instructions before it.
pub struct InstrList {
    nodes: Vec<Node>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl InstrList {
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        let mut list = InstrList {
            nodes: Vec::with_capacity(instructions.len()),
            head: None,
            tail: None,
        };
        for inst in instructions {
            list.push_back(inst);
        }
        list
    }

    fn push_back(&mut self, inst: Instruction) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            inst,
            prev: self.tail,
            next: None,
        });
        if let Some(tail) = self.tail {
            self.nodes[tail.0].next = Some(id);
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        id
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn get(&self, id: NodeId) -> &Instruction {
        &self.nodes[id.0].inst
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Instruction {
        &mut self.nodes[id.0].inst
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev
    }

    /// Splice `inst` in immediately before `at`, returning its new id.
    /// Updates `head` if `at` was the first node.
    pub fn insert_before(&mut self, at: NodeId, inst: Instruction) -> NodeId {
        let prev = self.nodes[at.0].prev;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            inst,
            prev,
            next: Some(at),
        });
        self.nodes[at.0].prev = Some(id);
        match prev {
            Some(p) => self.nodes[p.0].next = Some(id),
            None => self.head = Some(id),
        }
        id
    }

    /// Splice `inst` in immediately after `at`, returning its new id.
    /// Updates `tail` if `at` was the last node.
    pub fn insert_after(&mut self, at: NodeId, inst: Instruction) -> NodeId {
        let next = self.nodes[at.0].next;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            inst,
            prev: Some(at),
            next,
        });
        self.nodes[at.0].next = Some(id);
        match next {
            Some(n) => self.nodes[n.0].prev = Some(id),
            None => self.tail = Some(id),
        }
        id
    }

    /// Drain the list into a `Vec` in forward (program) order, following
    /// `next` links from the current head.
    pub fn into_vec(self) -> Vec<Instruction> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            out.push(self.nodes[id.0].inst.clone());
            cursor = self.nodes[id.0].next;
        }
        out
    }

    /// Forward-order node ids, from the *current* head. Used by the
    /// forward (liveness) pass; the reverse pass must record this order
    /// itself before making any insertions.
    pub fn node_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.nodes[id.0].next;
        }
        out
    }
}
