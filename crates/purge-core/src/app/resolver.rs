//! Exclusivity resolver: which of the target's artifacts are safe to delete.
//!
//! Pure function, no side effects. For each artifact of the target, every
//! other version's list of the same kind is scanned for a structurally equal
//! reference. Any hit makes the artifact shared; the owners are kept, in
//! catalog order, for diagnostics.
//!
//! The scan is O(targets x others x artifacts-per-other). Catalogs hold tens
//! of products, so a plain scan keeps the result deterministic and easy to
//! explain.

use crate::domain::{ProductKey, ProductVersion};

/// Where one target artifact landed.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement<A> {
    Exclusive(A),
    Shared { artifact: A, owners: Vec<ProductKey> },
}

impl<A> Placement<A> {
    pub fn artifact(&self) -> &A {
        match self {
            Placement::Exclusive(a) => a,
            Placement::Shared { artifact, .. } => artifact,
        }
    }
}

/// Partition of the target's artifacts, in the target's order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<A> {
    placements: Vec<Placement<A>>,
}

impl<A> Partition<A> {
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn placements(&self) -> &[Placement<A>] {
        &self.placements
    }

    pub fn exclusive(&self) -> impl Iterator<Item = &A> {
        self.placements.iter().filter_map(|p| match p {
            Placement::Exclusive(a) => Some(a),
            Placement::Shared { .. } => None,
        })
    }

    pub fn shared(&self) -> impl Iterator<Item = (&A, &[ProductKey])> {
        self.placements.iter().filter_map(|p| match p {
            Placement::Shared { artifact, owners } => Some((artifact, owners.as_slice())),
            Placement::Exclusive(_) => None,
        })
    }
}

impl<A> IntoIterator for Partition<A> {
    type Item = Placement<A>;
    type IntoIter = std::vec::IntoIter<Placement<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.into_iter()
    }
}

/// Split `targets` into exclusive and shared artifacts.
///
/// `accessor` selects the same kind's list from each other version. A
/// repeated target reference is placed once.
pub fn partition<A, F>(targets: &[A], others: &[&ProductVersion], accessor: F) -> Partition<A>
where
    A: Clone + PartialEq,
    F: Fn(&ProductVersion) -> &[A],
{
    let mut placements: Vec<Placement<A>> = Vec::with_capacity(targets.len());

    for (i, artifact) in targets.iter().enumerate() {
        if targets[..i].contains(artifact) {
            continue;
        }

        let owners: Vec<ProductKey> = others
            .iter()
            .copied()
            .filter(|other| accessor(other).contains(artifact))
            .map(|other| other.key().clone())
            .collect();

        if owners.is_empty() {
            placements.push(Placement::Exclusive(artifact.clone()));
        } else {
            placements.push(Placement::Shared {
                artifact: artifact.clone(),
                owners,
            });
        }
    }

    Partition { placements }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtifactRef, ContainerImage, ObjectArtifact};

    fn version(name: &str, version: &str, images: &[(&str, &str)]) -> ProductVersion {
        images.iter().fold(
            ProductVersion::new(ProductKey::new(name, version)),
            |p, (n, t)| p.with_container_image(ContainerImage::new(*n, *t)),
        )
    }

    #[test]
    fn shared_image_is_attributed_to_its_owner() {
        let target = version("sat", "2.0.3", &[("a", "1"), ("b", "1")]);
        let other = version("sat", "2.0.4", &[("a", "1")]);

        let p = partition(
            target.artifacts::<ContainerImage>(),
            &[&other],
            ContainerImage::artifacts_of,
        );

        let exclusive: Vec<_> = p.exclusive().cloned().collect();
        assert_eq!(exclusive, vec![ContainerImage::new("b", "1")]);

        let shared: Vec<_> = p.shared().collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].0, &ContainerImage::new("a", "1"));
        assert_eq!(shared[0].1, &[ProductKey::new("sat", "2.0.4")]);
    }

    #[test]
    fn owners_are_listed_in_catalog_order_without_dedup_by_name() {
        let target = version("sat", "2.0.3", &[("a", "1")]);
        let o1 = version("sat", "2.0.4", &[("a", "1")]);
        let o2 = version("cos", "1.0", &[("x", "1")]);
        let o3 = version("sat", "2.0.5", &[("a", "1"), ("z", "9")]);

        let p = partition(
            target.artifacts::<ContainerImage>(),
            &[&o1, &o2, &o3],
            ContainerImage::artifacts_of,
        );
        let (_, owners) = p.shared().next().unwrap();
        assert_eq!(
            owners,
            &[ProductKey::new("sat", "2.0.4"), ProductKey::new("sat", "2.0.5")]
        );
    }

    #[test]
    fn match_requires_every_field() {
        let target = version("sat", "2.0.3", &[("a", "1")]);
        let other = version("sat", "2.0.4", &[("a", "2")]);
        let p = partition(
            target.artifacts::<ContainerImage>(),
            &[&other],
            ContainerImage::artifacts_of,
        );
        assert_eq!(p.exclusive().count(), 1);
        assert_eq!(p.shared().count(), 0);
    }

    #[test]
    fn kinds_do_not_cross_match() {
        // same strings under a different kind do not make the image shared
        let target = version("sat", "2.0.3", &[("a", "1")]);
        let other = ProductVersion::new(ProductKey::new("cos", "1"))
            .with_object_artifact(ObjectArtifact::new("a", "1"));
        let p = partition(
            target.artifacts::<ContainerImage>(),
            &[&other],
            ContainerImage::artifacts_of,
        );
        assert_eq!(p.exclusive().count(), 1);
    }

    #[test]
    fn empty_kind_yields_empty_partition() {
        let target = version("sat", "2.0.3", &[]);
        let other = version("sat", "2.0.4", &[("a", "1")]);
        let p = partition(
            target.artifacts::<ContainerImage>(),
            &[&other],
            ContainerImage::artifacts_of,
        );
        assert!(p.is_empty());
    }

    #[test]
    fn repeated_target_reference_is_placed_once() {
        let target = version("sat", "2.0.3", &[("a", "1"), ("a", "1")]);
        let p = partition(target.artifacts::<ContainerImage>(), &[], ContainerImage::artifacts_of);
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn placements_keep_target_order() {
        let target = version("sat", "2.0.3", &[("c", "1"), ("a", "1"), ("b", "1")]);
        let other = version("sat", "2.0.4", &[("a", "1")]);
        let p = partition(
            target.artifacts::<ContainerImage>(),
            &[&other],
            ContainerImage::artifacts_of,
        );
        let order: Vec<String> = p.placements().iter().map(|pl| pl.artifact().to_string()).collect();
        assert_eq!(order, vec!["c:1", "a:1", "b:1"]);
    }
}
