use std::fmt;

///Coarse classification of a protocol, used for chain queries and for the
///tunnel loop check in the dispatch engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Layer {
    Link,
    Internet,
    Transport,
    Application,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Layer::*;
        match self {
            Link => write!(f, "Link"),
            Internet => write!(f, "Internet"),
            Transport => write!(f, "Transport"),
            Application => write!(f, "Application"),
        }
    }
}

///Ordered list of the protocol short names decoded for a single frame, one
///entry per successful decoder invocation.
///
///Renders as colon joined short names (e.g. `Ethernet:IPv4:TCP:HTTP`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtoChain {
    entries: Vec<(&'static str, Option<Layer>)>,
}

impl ProtoChain {
    pub fn new() -> ProtoChain {
        ProtoChain {
            entries: Vec::new(),
        }
    }

    ///Appends a decoded protocol. The raw fallback decoder carries no
    ///layer and is recorded with `None`.
    pub(crate) fn push(&mut self, short_name: &'static str, layer: Option<Layer>) {
        self.entries.push((short_name, layer));
    }

    ///Membership test by protocol short name (exact match).
    pub fn contains(&self, short_name: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == short_name)
    }

    ///Membership test by layer.
    pub fn contains_layer(&self, layer: Layer) -> bool {
        self.entries.iter().any(|(_, l)| *l == Some(layer))
    }

    ///True when a protocol with the given short name was already decoded at
    ///the given layer. Used by the engine to stop malformed tunnel loops.
    pub(crate) fn contains_at_layer(&self, short_name: &str, layer: Option<Layer>) -> bool {
        self.entries
            .iter()
            .any(|(name, l)| *name == short_name && *l == layer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    ///Iterates the short names in decoding order.
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl fmt::Display for ProtoChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, _)) in self.entries.iter().enumerate() {
            if index > 0 {
                write!(f, ":")?;
            }
            write!(f, "{}", name)?;
        }
        Ok(())
    }
}
