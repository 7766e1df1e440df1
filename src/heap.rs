// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory interpreter heap implementing the collaborator traits.
//!
//! Nodes live in an arena and are addressed by [`NodeRef`] handles. The
//! heap is append-only: nodes are never freed, so handles stay valid for the
//! heap's lifetime. Builder methods that store a handle bump the referenced
//! node's reference count, mirroring how a host would track sharing.

use crate::descriptor::Address;
use crate::kind::NodeKind;
use crate::port::{NamespaceResolver, RuntimeIntrospection};

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};

const BASE_ADDRESS: usize = 0x1000_0000;
const CELL_SIZE: usize = 0x38;

/// Handle to a node of a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);

impl NodeRef {
    fn for_slot(slot: usize) -> Result<Self> {
        match u32::try_from(slot) {
            Ok(index) => Ok(NodeRef(index)),
            Err(_) => bail!("heap is full at {slot} nodes"),
        }
    }
}

#[derive(Debug, Clone)]
struct Compact {
    class: NodeRef,
    class_name: String,
    data1: NodeRef,
    data2: NodeRef,
}

#[derive(Debug, Clone)]
enum Payload {
    Empty,
    Text(String),
    Elements(Vec<NodeRef>),
    Cons {
        car: NodeRef,
        cdr: NodeRef,
        tag: NodeRef,
    },
    Env {
        frame: NodeRef,
        hashtab: NodeRef,
        enclos: NodeRef,
        namespace: Option<String>,
        package: Option<String>,
    },
    Closure {
        formals: NodeRef,
        body: NodeRef,
        env: NodeRef,
    },
    Promise {
        value: NodeRef,
        code: NodeRef,
        env: NodeRef,
    },
    ExternalPtr {
        prot: NodeRef,
        tag: NodeRef,
    },
}

#[derive(Debug, Clone, Copy)]
enum ConsSlot {
    Car,
    Cdr,
    Tag,
}

#[derive(Debug, Clone)]
struct Cell {
    kind: NodeKind,
    // Element count of atomic vectors; derived from the payload otherwise.
    length: usize,
    capacity: usize,
    refs: u32,
    object: bool,
    attrib: NodeRef,
    names: Option<Vec<Option<String>>>,
    compact: Option<Compact>,
    payload: Payload,
}

impl Cell {
    fn new(kind: NodeKind, payload: Payload) -> Self {
        Self {
            kind,
            length: 0,
            capacity: 0,
            refs: 0,
            object: false,
            attrib: NIL,
            names: None,
            compact: None,
            payload,
        }
    }
}

const NIL: NodeRef = NodeRef(0);
const MISSING_ARG: NodeRef = NodeRef(1);
const EMPTY_ENV: NodeRef = NodeRef(2);
const BASE_ENV: NodeRef = NodeRef(3);
const GLOBAL_ENV: NodeRef = NodeRef(4);

/// Arena-backed interpreter heap.
#[derive(Debug, Clone)]
pub struct Heap {
    cells: Vec<Cell>,
    symbols: HashMap<String, NodeRef>,
    chars: HashMap<String, NodeRef>,
    compact_support: bool,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    pub fn new() -> Self {
        let env = |enclos| Payload::Env {
            frame: NIL,
            hashtab: NIL,
            enclos,
            namespace: None,
            package: None,
        };
        let cells = vec![
            Cell::new(NodeKind::Nil, Payload::Empty),
            // The missing-argument sentinel is a one-cell chain whose payload is itself.
            Cell::new(
                NodeKind::Dots,
                Payload::Cons {
                    car: MISSING_ARG,
                    cdr: NIL,
                    tag: NIL,
                },
            ),
            Cell::new(NodeKind::Environment, env(NIL)),
            Cell::new(NodeKind::Environment, env(EMPTY_ENV)),
            Cell::new(NodeKind::Environment, env(BASE_ENV)),
        ];

        Self {
            cells,
            symbols: HashMap::new(),
            chars: HashMap::new(),
            compact_support: true,
        }
    }

    /// Number of nodes allocated, singletons included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Makes the heap behave like a host without compact representations.
    pub fn set_compact_support(&mut self, supported: bool) {
        self.compact_support = supported;
    }

    fn alloc(&mut self, cell: Cell) -> Result<NodeRef> {
        let node = NodeRef::for_slot(self.cells.len())?;
        self.cells.push(cell);
        Ok(node)
    }

    fn cell(&self, node: NodeRef) -> &Cell {
        &self.cells[node.0 as usize]
    }

    fn cell_mut(&mut self, node: NodeRef) -> Result<&mut Cell> {
        match self.cells.get_mut(node.0 as usize) {
            Some(cell) => Ok(cell),
            None => bail!("node {} does not belong to this heap", node.0),
        }
    }

    fn check(&self, nodes: &[NodeRef]) -> Result<()> {
        for node in nodes {
            if node.0 as usize >= self.cells.len() {
                bail!("node {} does not belong to this heap", node.0);
            }
        }
        Ok(())
    }

    fn link(&mut self, node: NodeRef) {
        if let Some(cell) = self.cells.get_mut(node.0 as usize) {
            cell.refs = cell.refs.saturating_add(1);
        }
    }

    fn unlink(&mut self, node: NodeRef) {
        if let Some(cell) = self.cells.get_mut(node.0 as usize) {
            cell.refs = cell.refs.saturating_sub(1);
        }
    }

    fn alloc_linked(&mut self, cell: Cell, links: &[NodeRef]) -> Result<NodeRef> {
        self.check(links)?;
        let node = self.alloc(cell)?;
        for link in links {
            self.link(*link);
        }
        Ok(node)
    }

    // Replaces one handle slot, keeping reference counts in step.
    fn relink(&mut self, old: NodeRef, new: NodeRef) {
        self.unlink(old);
        self.link(new);
    }

    /// Atomic vector of `len` elements.
    pub fn atomic(&mut self, kind: NodeKind, len: usize) -> Result<NodeRef> {
        if !kind.is_atomic() {
            bail!("{kind} is not an atomic vector kind");
        }
        let mut cell = Cell::new(kind, Payload::Empty);
        cell.length = len;
        self.alloc(cell)
    }

    /// Interned text atom.
    pub fn char(&mut self, text: &str) -> Result<NodeRef> {
        if let Some(node) = self.chars.get(text) {
            return Ok(*node);
        }
        let node = self.alloc(Cell::new(NodeKind::Char, Payload::Text(text.to_string())))?;
        self.chars.insert(text.to_string(), node);
        Ok(node)
    }

    /// Interned symbol.
    pub fn symbol(&mut self, name: &str) -> Result<NodeRef> {
        if let Some(node) = self.symbols.get(name) {
            return Ok(*node);
        }
        let node = self.alloc(Cell::new(NodeKind::Symbol, Payload::Text(name.to_string())))?;
        self.symbols.insert(name.to_string(), node);
        Ok(node)
    }

    pub fn builtin(&mut self, name: &str) -> Result<NodeRef> {
        self.alloc(Cell::new(NodeKind::Builtin, Payload::Text(name.to_string())))
    }

    pub fn special(&mut self, name: &str) -> Result<NodeRef> {
        self.alloc(Cell::new(NodeKind::Special, Payload::Text(name.to_string())))
    }

    /// Node of a kind this crate does not know, as a newer host might produce.
    pub fn unrecognized(&mut self, kind_name: &str) -> Result<NodeRef> {
        self.alloc(Cell::new(
            NodeKind::Unrecognized(kind_name.to_string()),
            Payload::Empty,
        ))
    }

    /// Character container holding the interned atoms of `texts`.
    pub fn strings(&mut self, texts: &[&str]) -> Result<NodeRef> {
        let atoms = texts
            .iter()
            .map(|t| self.char(t))
            .collect::<Result<Vec<_>>>()?;
        for atom in &atoms {
            self.link(*atom);
        }
        self.alloc(Cell::new(NodeKind::Character, Payload::Elements(atoms)))
    }

    fn container(&mut self, kind: NodeKind, elements: &[NodeRef]) -> Result<NodeRef> {
        self.alloc_linked(
            Cell::new(kind, Payload::Elements(elements.to_vec())),
            elements,
        )
    }

    pub fn list(&mut self, elements: &[NodeRef]) -> Result<NodeRef> {
        self.container(NodeKind::List, elements)
    }

    pub fn expression(&mut self, elements: &[NodeRef]) -> Result<NodeRef> {
        self.container(NodeKind::Expression, elements)
    }

    /// Weak reference cell; `slots` are its key, value and finalizer.
    pub fn weak_ref(&mut self, slots: &[NodeRef]) -> Result<NodeRef> {
        self.container(NodeKind::WeakRef, slots)
    }

    fn cons_of(
        &mut self,
        kind: NodeKind,
        tag: NodeRef,
        car: NodeRef,
        cdr: NodeRef,
    ) -> Result<NodeRef> {
        self.alloc_linked(
            Cell::new(kind, Payload::Cons { car, cdr, tag }),
            &[tag, car, cdr],
        )
    }

    pub fn cons(&mut self, car: NodeRef, cdr: NodeRef) -> Result<NodeRef> {
        self.cons_of(NodeKind::PairList, NIL, car, cdr)
    }

    fn chain(&mut self, kind: NodeKind, items: &[(Option<&str>, NodeRef)]) -> Result<NodeRef> {
        let mut head = NIL;
        for (name, value) in items.iter().rev() {
            let tag = match name {
                Some(name) => self.symbol(name)?,
                None => NIL,
            };
            head = self.cons_of(kind.clone(), tag, *value, head)?;
        }
        Ok(head)
    }

    /// Pair-list chain; named items get symbol tags.
    pub fn pairlist(&mut self, items: &[(Option<&str>, NodeRef)]) -> Result<NodeRef> {
        self.chain(NodeKind::PairList, items)
    }

    /// `...` argument chain.
    pub fn dots(&mut self, items: &[(Option<&str>, NodeRef)]) -> Result<NodeRef> {
        self.chain(NodeKind::Dots, items)
    }

    /// Unevaluated call of `function` with `args`.
    pub fn call(&mut self, function: NodeRef, args: &[(Option<&str>, NodeRef)]) -> Result<NodeRef> {
        let rest = self.pairlist(args)?;
        self.cons_of(NodeKind::Call, NIL, function, rest)
    }

    pub fn bytecode(&mut self, tag: NodeRef, car: NodeRef, cdr: NodeRef) -> Result<NodeRef> {
        self.cons_of(NodeKind::ByteCode, tag, car, cdr)
    }

    pub fn formal_object(&mut self, tag: NodeRef) -> Result<NodeRef> {
        let node = self.cons_of(NodeKind::FormalObject, tag, NIL, NIL)?;
        self.cell_mut(node)?.object = true;
        Ok(node)
    }

    fn env_of(
        &mut self,
        enclos: NodeRef,
        namespace: Option<String>,
        package: Option<String>,
    ) -> Result<NodeRef> {
        self.alloc_linked(
            Cell::new(
                NodeKind::Environment,
                Payload::Env {
                    frame: NIL,
                    hashtab: NIL,
                    enclos,
                    namespace,
                    package,
                },
            ),
            &[enclos],
        )
    }

    pub fn env(&mut self, enclos: NodeRef) -> Result<NodeRef> {
        self.env_of(enclos, None, None)
    }

    /// Top-level scope of a loaded package.
    pub fn namespace(&mut self, name: &str, enclos: NodeRef) -> Result<NodeRef> {
        self.env_of(enclos, Some(name.to_string()), None)
    }

    /// Attached package environment; named but traversed like any other.
    pub fn package_env(&mut self, name: &str, enclos: NodeRef) -> Result<NodeRef> {
        self.env_of(enclos, None, Some(name.to_string()))
    }

    /// Binds `name` in `env`, updating an existing local binding in place.
    pub fn bind(&mut self, env: NodeRef, name: &str, value: NodeRef) -> Result<()> {
        self.check(&[value])?;
        let frame = match &self.cell_mut(env)?.payload {
            Payload::Env { frame, .. } => *frame,
            _ => bail!("node {} is not an environment", env.0),
        };

        let symbol = self.symbol(name)?;
        if let Some(cell) = self.find_binding(frame, symbol) {
            return self.set_car(cell, value);
        }

        let cell = self.cons_of(NodeKind::PairList, symbol, value, frame)?;
        // The new cell takes over the frame reference from the environment.
        self.unlink(frame);
        self.link(cell);
        if let Payload::Env { frame, .. } = &mut self.cell_mut(env)?.payload {
            *frame = cell;
        }
        Ok(())
    }

    fn find_binding(&self, frame: NodeRef, symbol: NodeRef) -> Option<NodeRef> {
        let mut visited = HashSet::new();
        let mut cell = frame;
        while cell != NIL && visited.insert(cell) {
            match self.cell(cell).payload {
                Payload::Cons { tag, cdr, .. } => {
                    if tag == symbol {
                        return Some(cell);
                    }
                    cell = cdr;
                }
                _ => break,
            }
        }
        None
    }

    pub fn set_enclos(&mut self, env: NodeRef, enclos: NodeRef) -> Result<()> {
        self.check(&[enclos])?;
        let old = match &mut self.cell_mut(env)?.payload {
            Payload::Env { enclos: slot, .. } => core::mem::replace(slot, enclos),
            _ => bail!("node {} is not an environment", env.0),
        };
        self.relink(old, enclos);
        Ok(())
    }

    pub fn closure(&mut self, formals: NodeRef, body: NodeRef, env: NodeRef) -> Result<NodeRef> {
        self.alloc_linked(
            Cell::new(NodeKind::Closure, Payload::Closure { formals, body, env }),
            &[formals, body, env],
        )
    }

    /// Unforced promise of `code` in `env`.
    pub fn promise(&mut self, code: NodeRef, env: NodeRef) -> Result<NodeRef> {
        self.alloc_linked(
            Cell::new(
                NodeKind::Promise,
                Payload::Promise {
                    value: NIL,
                    code,
                    env,
                },
            ),
            &[code, env],
        )
    }

    /// Records the forced value of a promise and drops its environment.
    pub fn force(&mut self, promise: NodeRef, forced: NodeRef) -> Result<()> {
        self.check(&[forced])?;
        let (old_value, old_env) = match &mut self.cell_mut(promise)?.payload {
            Payload::Promise { value, env, .. } => (
                core::mem::replace(value, forced),
                core::mem::replace(env, NIL),
            ),
            _ => bail!("node {} is not a promise", promise.0),
        };
        self.relink(old_value, forced);
        self.unlink(old_env);
        Ok(())
    }

    pub fn external_ptr(&mut self, prot: NodeRef, tag: NodeRef) -> Result<NodeRef> {
        self.alloc_linked(
            Cell::new(NodeKind::ExternalPtr, Payload::ExternalPtr { prot, tag }),
            &[prot, tag],
        )
    }

    fn set_cons_slot(&mut self, node: NodeRef, slot: ConsSlot, value: NodeRef) -> Result<()> {
        self.check(&[value])?;
        let old = match &mut self.cell_mut(node)?.payload {
            Payload::Cons { car, cdr, tag } => {
                let target = match slot {
                    ConsSlot::Car => car,
                    ConsSlot::Cdr => cdr,
                    ConsSlot::Tag => tag,
                };
                core::mem::replace(target, value)
            }
            _ => bail!("node {} is not a cons cell", node.0),
        };
        self.relink(old, value);
        Ok(())
    }

    pub fn set_car(&mut self, node: NodeRef, car: NodeRef) -> Result<()> {
        self.set_cons_slot(node, ConsSlot::Car, car)
    }

    pub fn set_cdr(&mut self, node: NodeRef, cdr: NodeRef) -> Result<()> {
        self.set_cons_slot(node, ConsSlot::Cdr, cdr)
    }

    pub fn set_tag(&mut self, node: NodeRef, tag: NodeRef) -> Result<()> {
        self.set_cons_slot(node, ConsSlot::Tag, tag)
    }

    pub fn set_elements(&mut self, node: NodeRef, elements: &[NodeRef]) -> Result<()> {
        self.check(elements)?;
        let old = match &mut self.cell_mut(node)?.payload {
            Payload::Elements(slot) => core::mem::replace(slot, elements.to_vec()),
            _ => bail!("node {} is not a container", node.0),
        };
        for node in old {
            self.unlink(node);
        }
        for node in elements {
            self.link(*node);
        }
        Ok(())
    }

    pub fn set_names(&mut self, node: NodeRef, names: &[Option<&str>]) -> Result<()> {
        let cell = self.cell_mut(node)?;
        if !matches!(cell.payload, Payload::Elements(_)) {
            bail!("node {} is not a container", node.0);
        }
        cell.names = Some(names.iter().map(|n| n.map(str::to_string)).collect());
        Ok(())
    }

    /// Sets the allocated capacity of a vector-like node.
    pub fn set_capacity(&mut self, node: NodeRef, capacity: usize) -> Result<()> {
        let cell = self.cell_mut(node)?;
        if !cell.kind.is_vector_like() {
            bail!("{} nodes have no capacity", cell.kind);
        }
        cell.capacity = capacity;
        Ok(())
    }

    pub fn set_attributes(&mut self, node: NodeRef, attributes: NodeRef) -> Result<()> {
        self.check(&[attributes])?;
        let old = core::mem::replace(&mut self.cell_mut(node)?.attrib, attributes);
        self.relink(old, attributes);
        Ok(())
    }

    pub fn set_object(&mut self, node: NodeRef, object: bool) -> Result<()> {
        self.cell_mut(node)?.object = object;
        Ok(())
    }

    pub fn set_ref_count(&mut self, node: NodeRef, refs: u32) -> Result<()> {
        self.cell_mut(node)?.refs = refs;
        Ok(())
    }

    /// Marks `node` as a compact representation of its kind.
    pub fn set_compact(
        &mut self,
        node: NodeRef,
        class: NodeRef,
        class_name: &str,
        data1: NodeRef,
        data2: NodeRef,
    ) -> Result<()> {
        self.check(&[class, data1, data2])?;
        let compact = Compact {
            class,
            class_name: class_name.to_string(),
            data1,
            data2,
        };
        let old = self.cell_mut(node)?.compact.replace(compact.clone());
        if let Some(old) = old {
            for node in [old.class, old.data1, old.data2] {
                self.unlink(node);
            }
        }
        for node in [compact.class, compact.data1, compact.data2] {
            self.link(node);
        }
        Ok(())
    }

    // `field` picks one of (car, cdr, tag); non-cons nodes read as nil.
    fn cons_field(
        &self,
        node: NodeRef,
        field: fn(NodeRef, NodeRef, NodeRef) -> NodeRef,
    ) -> NodeRef {
        match self.cell(node).payload {
            Payload::Cons { car, cdr, tag } => field(car, cdr, tag),
            _ => NIL,
        }
    }

    fn chain_length(&self, node: NodeRef) -> usize {
        let mut visited = HashSet::new();
        let mut cell = node;
        while cell != NIL && self.cell(cell).kind.is_pair_list() && visited.insert(cell) {
            cell = self.cons_field(cell, |_, cdr, _| cdr);
        }
        visited.len()
    }

    fn text(&self, node: NodeRef) -> &str {
        match &self.cell(node).payload {
            Payload::Text(text) => text.as_str(),
            _ => "",
        }
    }
}

impl RuntimeIntrospection for Heap {
    type Node = NodeRef;

    fn address(&self, node: NodeRef) -> Address {
        Address(BASE_ADDRESS + node.0 as usize * CELL_SIZE)
    }

    fn kind(&self, node: NodeRef) -> NodeKind {
        self.cell(node).kind.clone()
    }

    fn length(&self, node: NodeRef) -> usize {
        let cell = self.cell(node);
        match (&cell.kind, &cell.payload) {
            (NodeKind::Nil, _) => 0,
            (_, Payload::Elements(elements)) => elements.len(),
            (NodeKind::Char, Payload::Text(text)) => text.len(),
            (NodeKind::Environment, _) => self.local_bindings(node).len(),
            (kind, _) if kind.is_pair_list() => self.chain_length(node),
            (kind, _) if kind.is_atomic() => cell.length,
            _ => 1,
        }
    }

    fn true_length(&self, node: NodeRef) -> usize {
        self.cell(node).capacity
    }

    fn supports_compact(&self) -> bool {
        self.compact_support
    }

    fn is_compact(&self, node: NodeRef) -> bool {
        self.cell(node).compact.is_some()
    }

    fn compact_class(&self, node: NodeRef) -> NodeRef {
        self.cell(node).compact.as_ref().map_or(NIL, |c| c.class)
    }

    fn compact_class_name(&self, node: NodeRef) -> Option<String> {
        self.cell(node)
            .compact
            .as_ref()
            .map(|c| c.class_name.clone())
    }

    fn compact_data1(&self, node: NodeRef) -> NodeRef {
        self.cell(node).compact.as_ref().map_or(NIL, |c| c.data1)
    }

    fn compact_data2(&self, node: NodeRef) -> NodeRef {
        self.cell(node).compact.as_ref().map_or(NIL, |c| c.data2)
    }

    fn ref_count(&self, node: NodeRef) -> u32 {
        self.cell(node).refs
    }

    fn is_object(&self, node: NodeRef) -> bool {
        self.cell(node).object
    }

    fn symbol_text(&self, node: NodeRef) -> String {
        self.text(node).to_string()
    }

    fn element(&self, node: NodeRef, index: usize) -> NodeRef {
        match &self.cell(node).payload {
            Payload::Elements(elements) => elements.get(index).copied().unwrap_or(NIL),
            _ => NIL,
        }
    }

    fn names(&self, node: NodeRef) -> Option<Vec<Option<String>>> {
        self.cell(node).names.clone()
    }

    fn car(&self, node: NodeRef) -> NodeRef {
        self.cons_field(node, |car, _, _| car)
    }

    fn cdr(&self, node: NodeRef) -> NodeRef {
        self.cons_field(node, |_, cdr, _| cdr)
    }

    fn tag(&self, node: NodeRef) -> NodeRef {
        self.cons_field(node, |_, _, tag| tag)
    }

    fn frame(&self, env: NodeRef) -> NodeRef {
        match self.cell(env).payload {
            Payload::Env { frame, .. } => frame,
            _ => NIL,
        }
    }

    fn hashtab(&self, env: NodeRef) -> NodeRef {
        match self.cell(env).payload {
            Payload::Env { hashtab, .. } => hashtab,
            _ => NIL,
        }
    }

    fn enclos(&self, env: NodeRef) -> NodeRef {
        match self.cell(env).payload {
            Payload::Env { enclos, .. } => enclos,
            _ => NIL,
        }
    }

    fn local_bindings(&self, env: NodeRef) -> Vec<(String, NodeRef)> {
        let mut bindings = vec![];
        let mut visited = HashSet::new();
        let mut cell = self.frame(env);
        while cell != NIL && visited.insert(cell) {
            let Payload::Cons { car, cdr, tag } = self.cell(cell).payload else {
                break;
            };
            bindings.push((self.text(tag).to_string(), car));
            cell = cdr;
        }
        bindings
    }

    fn formals(&self, closure: NodeRef) -> NodeRef {
        match self.cell(closure).payload {
            Payload::Closure { formals, .. } => formals,
            _ => NIL,
        }
    }

    fn body(&self, closure: NodeRef) -> NodeRef {
        match self.cell(closure).payload {
            Payload::Closure { body, .. } => body,
            _ => NIL,
        }
    }

    fn closure_env(&self, closure: NodeRef) -> NodeRef {
        match self.cell(closure).payload {
            Payload::Closure { env, .. } => env,
            _ => NIL,
        }
    }

    fn promise_value(&self, promise: NodeRef) -> NodeRef {
        match self.cell(promise).payload {
            Payload::Promise { value, .. } => value,
            _ => NIL,
        }
    }

    fn promise_code(&self, promise: NodeRef) -> NodeRef {
        match self.cell(promise).payload {
            Payload::Promise { code, .. } => code,
            _ => NIL,
        }
    }

    fn promise_env(&self, promise: NodeRef) -> NodeRef {
        match self.cell(promise).payload {
            Payload::Promise { env, .. } => env,
            _ => NIL,
        }
    }

    fn extptr_prot(&self, ptr: NodeRef) -> NodeRef {
        match self.cell(ptr).payload {
            Payload::ExternalPtr { prot, .. } => prot,
            _ => NIL,
        }
    }

    fn extptr_tag(&self, ptr: NodeRef) -> NodeRef {
        match self.cell(ptr).payload {
            Payload::ExternalPtr { tag, .. } => tag,
            _ => NIL,
        }
    }

    fn attributes(&self, node: NodeRef) -> NodeRef {
        self.cell(node).attrib
    }

    fn nil(&self) -> NodeRef {
        NIL
    }

    fn missing_arg(&self) -> NodeRef {
        MISSING_ARG
    }

    fn global_env(&self) -> NodeRef {
        GLOBAL_ENV
    }

    fn base_env(&self) -> NodeRef {
        BASE_ENV
    }

    fn empty_env(&self) -> NodeRef {
        EMPTY_ENV
    }
}

impl NamespaceResolver<NodeRef> for Heap {
    fn is_namespace(&self, env: NodeRef) -> bool {
        matches!(
            &self.cell(env).payload,
            Payload::Env {
                namespace: Some(_),
                ..
            }
        )
    }

    fn package_name(&self, env: NodeRef) -> Option<String> {
        match &self.cell(env).payload {
            Payload::Env {
                namespace, package, ..
            } => namespace.clone().or_else(|| package.clone()),
            _ => None,
        }
    }
}
