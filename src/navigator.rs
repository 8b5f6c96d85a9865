// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only node lookups over the structure block.
//!
//! Nodes are addressed by [`NodeRef`], the byte offset of their
//! `FDT_BEGIN_NODE` token. Searches visit nodes depth-first, which is also
//! increasing offset order, so "continue after this node" is simply "the next
//! match with a larger offset".

use crate::{
    parsing::{BigEndianToken, FdtData, ParseError, StringsBlock},
    Fdt, FdtError,
};

/// Deepest nesting the parent lookup keeps track of
const MAX_DEPTH: usize = 64;

/// `#address-cells` value assumed when a node doesn't declare one
const DEFAULT_ADDRESS_CELLS: u32 = 2;
/// `#size-cells` value assumed when a node doesn't declare one
const DEFAULT_SIZE_CELLS: u32 = 1;
/// `#interrupt-cells` value assumed when a node doesn't declare one
const DEFAULT_INTERRUPT_CELLS: u32 = 2;

/// Handle to a node inside a particular [`Fdt`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef(usize);

impl NodeRef {
    /// Byte offset of the node within the structure block
    pub fn offset(self) -> usize {
        self.0
    }
}

/// A node property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeProperty<'a> {
    /// Property name
    pub name: &'a str,
    /// Property value
    pub value: &'a [u8],
}

impl<'a> NodeProperty<'a> {
    /// Attempt to parse the property value as a single `u32`
    pub fn as_u32(self) -> Option<u32> {
        match self.value {
            [a, b, c, d] => Some(u32::from_be_bytes([*a, *b, *c, *d])),
            _ => None,
        }
    }

    /// Attempts to parse the property value as a list of [`&str`].
    pub fn iter_str(self) -> impl Iterator<Item = &'a str> + 'a {
        let mut s = core::str::from_utf8(self.value).ok().map(|s| s.trim_end_matches('\0').split('\0'));

        core::iter::from_fn(move || match s.as_mut() {
            Some(s) => s.next(),
            None => None,
        })
    }
}

/// Depth-first walk over every node, yielding each node with its depth
/// (the root is depth 0)
struct AllNodes<'a> {
    stream: FdtData<'a>,
    depth: usize,
    done: bool,
}

impl<'a> AllNodes<'a> {
    fn new(fdt: &Fdt<'a>) -> Self {
        Self { stream: FdtData::new(fdt.structs_block()), depth: 0, done: false }
    }

    fn advance(&mut self) -> Result<Option<(NodeRef, usize)>, FdtError> {
        loop {
            let offset = self.stream.offset();
            match self.stream.advance_token()? {
                BigEndianToken::BEGIN_NODE => {
                    self.stream.advance_cstr()?;
                    self.depth += 1;

                    return Ok(Some((NodeRef(offset), self.depth - 1)));
                }
                BigEndianToken::PROP => {
                    self.stream.parse_raw_property()?;
                }
                BigEndianToken::END_NODE => {
                    self.depth = self.depth.checked_sub(1).ok_or(ParseError::UnexpectedToken)?;
                }
                BigEndianToken::END => return Ok(None),
                _ => {}
            }
        }
    }
}

impl Iterator for AllNodes<'_> {
    type Item = Result<(NodeRef, usize), FdtError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = self.advance().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }

        next
    }
}

/// The properties of one node, in blob order
pub struct NodeProperties<'a> {
    stream: FdtData<'a>,
    strings: StringsBlock<'a>,
    done: bool,
}

impl<'a> NodeProperties<'a> {
    fn advance(&mut self) -> Result<Option<NodeProperty<'a>>, FdtError> {
        self.stream.skip_nops()?;

        match BigEndianToken(self.stream.peek_u32()?) {
            BigEndianToken::PROP => {
                self.stream.advance_token()?;
                let (name_offset, value) = self.stream.parse_raw_property()?;

                Ok(Some(NodeProperty { name: self.strings.offset_at(name_offset)?, value }))
            }
            _ => Ok(None),
        }
    }
}

impl<'a> Iterator for NodeProperties<'a> {
    type Item = Result<NodeProperty<'a>, FdtError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = self.advance().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }

        next
    }
}

impl<'a> Fdt<'a> {
    /// Returns an iterator over the properties of `node`
    pub fn properties(&self, node: NodeRef) -> Result<NodeProperties<'a>, FdtError> {
        let mut stream = FdtData::at(self.structs_block(), node.0)?;
        match stream.advance_token()? {
            BigEndianToken::BEGIN_NODE => {}
            _ => return Err(ParseError::UnexpectedToken.into()),
        }
        stream.advance_cstr()?;

        Ok(NodeProperties { stream, strings: self.strings_block(), done: false })
    }

    /// Attempts to find a property of `node` by its name
    pub fn property(&self, node: NodeRef, name: &str) -> Result<Option<NodeProperty<'a>>, FdtError> {
        for property in self.properties(node)? {
            let property = property?;
            if property.name == name {
                return Ok(Some(property));
            }
        }

        Ok(None)
    }

    /// Unit name of `node`, e.g. `cpu@0`; the root is named `/`
    pub fn node_name(&self, node: NodeRef) -> Result<&'a str, FdtError> {
        let mut stream = FdtData::at(self.structs_block(), node.0)?;
        match stream.advance_token()? {
            BigEndianToken::BEGIN_NODE => {}
            _ => return Err(ParseError::UnexpectedToken.into()),
        }

        match stream.advance_cstr()? {
            "" => Ok("/"),
            name => Ok(name),
        }
    }

    /// Finds the first node after `start` (or the first node at all, root
    /// included, when `start` is `None`) whose `name` property is exactly
    /// `value`, byte for byte. String values must include their terminating
    /// NUL, e.g. `b"cpu\0"`.
    pub fn node_offset_by_prop_value(
        &self,
        start: Option<NodeRef>,
        name: &str,
        value: &[u8],
    ) -> Result<Option<NodeRef>, FdtError> {
        self.find_after(start, |node| Ok(self.property(node, name)?.is_some_and(|p| p.value == value)))
    }

    /// Finds the first node after `start` whose `compatible` string list
    /// contains `compatible`
    pub fn node_offset_by_compatible(
        &self,
        start: Option<NodeRef>,
        compatible: &str,
    ) -> Result<Option<NodeRef>, FdtError> {
        self.find_after(start, |node| {
            Ok(self.property(node, "compatible")?.is_some_and(|p| p.iter_str().any(|c| c == compatible)))
        })
    }

    /// Parent of `node`, or `None` for the root
    pub fn parent_offset(&self, node: NodeRef) -> Result<Option<NodeRef>, FdtError> {
        let mut parents = [NodeRef(0); MAX_DEPTH];

        for next in AllNodes::new(self) {
            let (current, depth) = next?;
            if current == node {
                return Ok(depth.checked_sub(1).map(|d| parents[d]));
            }

            *parents.get_mut(depth).ok_or(ParseError::NestingTooDeep)? = current;
        }

        Err(ParseError::UnexpectedEndOfData.into())
    }

    /// `#address-cells` of `node` itself, defaulting to 2
    pub fn address_cells(&self, node: NodeRef) -> Result<u32, FdtError> {
        self.cells(node, "#address-cells", DEFAULT_ADDRESS_CELLS)
    }

    /// `#size-cells` of `node` itself, defaulting to 1
    pub fn size_cells(&self, node: NodeRef) -> Result<u32, FdtError> {
        self.cells(node, "#size-cells", DEFAULT_SIZE_CELLS)
    }

    /// `#interrupt-cells` of `node` itself, defaulting to 2
    pub fn interrupt_cells(&self, node: NodeRef) -> Result<u32, FdtError> {
        self.cells(node, "#interrupt-cells", DEFAULT_INTERRUPT_CELLS)
    }

    fn cells(&self, node: NodeRef, name: &str, default: u32) -> Result<u32, FdtError> {
        match self.property(node, name)? {
            Some(prop) => prop.as_u32().ok_or(FdtError::ParseError(ParseError::InvalidPropertyValue)),
            None => Ok(default),
        }
    }

    fn find_after(
        &self,
        start: Option<NodeRef>,
        mut matches: impl FnMut(NodeRef) -> Result<bool, FdtError>,
    ) -> Result<Option<NodeRef>, FdtError> {
        for next in AllNodes::new(self) {
            let (node, _) = next?;
            if start.is_some_and(|start| node <= start) {
                continue;
            }

            if matches(node)? {
                return Ok(Some(node));
            }
        }

        Ok(None)
    }
}
