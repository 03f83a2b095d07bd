use std::collections::BTreeSet;

use serde::Serialize;

/// Component identifier as written in the case files
pub type ComponentId = u32;

/// Ordered set of component identifiers
pub type IdSet = BTreeSet<ComponentId>;

/// Which kill mechanism a component's PK is reported for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PkSource {
    DirectHit,
    Blast,
    Fragmentation,
}

/// Borrowed view of the role sets declared across a case.
///
/// Direct-hit and blast sets come from the output file, the fragmentation
/// set from the AV file.
#[derive(Debug, Clone, Copy)]
pub struct ComponentRoles<'a> {
    pub direct_hit: &'a IdSet,
    pub blast: &'a IdSet,
    pub fragmentation: &'a IdSet,
}

impl<'a> ComponentRoles<'a> {
    /// Role whose PK applies to `id`; direct hit wins over blast, blast over fragmentation
    pub fn classify(&self, id: ComponentId) -> Option<PkSource> {
        if self.direct_hit.contains(&id) {
            Some(PkSource::DirectHit)
        } else if self.blast.contains(&id) {
            Some(PkSource::Blast)
        } else if self.fragmentation.contains(&id) {
            Some(PkSource::Fragmentation)
        } else {
            None
        }
    }

    /// Every component that belongs to at least one role
    pub fn tracked(&self) -> IdSet {
        self.direct_hit
            .iter()
            .chain(self.blast)
            .chain(self.fragmentation)
            .copied()
            .collect()
    }
}
