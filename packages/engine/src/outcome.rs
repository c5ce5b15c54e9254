use crate::tree::NodeId;

/// What a handler asks the scanner to do after it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not handled; the engine tries the next handler
    Ignored,
    /// Continue with the position computed before dispatch
    Proceed,
    /// Continue at this node, inclusive
    RestartAt(NodeId),
    /// Start over from the root
    FullRescan,
    /// Stop scanning
    EndOfDoc,
}

impl Outcome {
    /// Join of two outcomes produced by one dispatch.
    ///
    /// `Ignored` is the identity and `FullRescan` absorbs everything. Two
    /// different restart points, or an end of document racing with any
    /// other request, can only be reconciled by a full rescan.
    pub fn combine(self, other: Outcome) -> Outcome {
        use Outcome::*;
        match (self, other) {
            (Ignored, o) | (o, Ignored) => o,
            (FullRescan, _) | (_, FullRescan) => FullRescan,
            (EndOfDoc, EndOfDoc) => EndOfDoc,
            (EndOfDoc, _) | (_, EndOfDoc) => FullRescan,
            (RestartAt(a), RestartAt(b)) if a == b => RestartAt(a),
            (RestartAt(_), RestartAt(_)) => FullRescan,
            (RestartAt(n), Proceed) | (Proceed, RestartAt(n)) => RestartAt(n),
            (Proceed, Proceed) => Proceed,
        }
    }

    pub fn is_handled(&self) -> bool {
        *self != Outcome::Ignored
    }
}

impl FromIterator<Outcome> for Outcome {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        iter.into_iter().fold(Outcome::Ignored, Outcome::combine)
    }
}
