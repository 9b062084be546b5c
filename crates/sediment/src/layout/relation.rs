//! Pull and weight relations derived from connectors.
//!
//! For every connector the first endpoint that names a sinker is the heavy
//! end and every later one is a light end. Each light end pulls toward the
//! heavy end, and the heavy end carries the light end as weight.
//!
//! The sets keep every connector as written. A pair that pulls both ways
//! (A is heavy in one connector and light in another against B) is a
//! *mutual* pair; consumers ignore such pairs through [`effective_weights`]
//! and [`effective_pulls`].

use indexmap::IndexSet;
use log::trace;

use sediment_core::{diagram::Connector, identifier::Id};

use super::sinker::Sinker;

/// Fills the `pulls` and `weights` sets of `sinkers` from `connectors`.
///
/// `index` maps a concept identifier to its position in `sinkers`.
/// Endpoints naming anything else are skipped, as are self-relations.
pub fn link<'a>(
    sinkers: &mut [Sinker],
    index: &IndexSet<Id>,
    connectors: impl IntoIterator<Item = &'a Connector>,
) {
    for connector in connectors {
        let mut ends = connector
            .endpoints()
            .iter()
            .filter_map(|endpoint| index.get_index_of(&endpoint.concept()));

        let Some(heavy) = ends.next() else {
            continue;
        };

        for light in ends {
            if light == heavy {
                continue;
            }
            sinkers[light].add_pull(heavy);
            sinkers[heavy].add_weight(light);
            trace!(
                heavy = sinkers[heavy].id().to_string(),
                light = sinkers[light].id().to_string();
                "Linked",
            );
        }
    }
}

/// Returns true when `a` and `b` pull toward each other.
pub fn is_mutual(sinkers: &[Sinker], a: usize, b: usize) -> bool {
    sinkers[a].pulls().contains(&b) && sinkers[b].pulls().contains(&a)
}

/// The weights of `node` that count toward its mass: mutual partners are skipped.
pub fn effective_weights(sinkers: &[Sinker], node: usize) -> impl Iterator<Item = usize> + '_ {
    sinkers[node]
        .weights()
        .iter()
        .copied()
        .filter(move |&load| !sinkers[load].weights().contains(&node))
}

/// The pulls of `node` that steer it: mutual partners are skipped.
pub fn effective_pulls(sinkers: &[Sinker], node: usize) -> impl Iterator<Item = usize> + '_ {
    sinkers[node]
        .pulls()
        .iter()
        .copied()
        .filter(move |target| !sinkers[node].weights().contains(target))
}
