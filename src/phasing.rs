/*!
# Phasing
Turns trio genotypes into a child phase call.
The inference itself lives behind the `TrioPhaser` trait; `PhaseResolver` only validates and classifies what comes back.
*/
use log::trace;

use crate::data_types::genotype::{Genotype, PedigreeGenotype};
use crate::data_types::phase_enums::{PhaseCall, PhaseError};

/// Anything that can produce a phase token from (father, mother, child) genotype strings.
/// Tokens are "<a>|<b>" when phased (paternal first) and "<a>/<b>" otherwise.
pub trait TrioPhaser {
    fn phase(&self, father: &str, mother: &str, child: &str) -> String;
}

/// Phases a child call by Mendelian inheritance from whichever parents are called.
#[derive(Clone, Copy, Debug, Default)]
pub struct MendelianPhaser;

impl MendelianPhaser {
    /// Returns true if the parent could have transmitted the allele.
    /// A missing parent could have transmitted anything.
    fn can_transmit(parent: Genotype, allele: usize) -> bool {
        parent.is_missing() || parent.contains(allele)
    }
}

impl TrioPhaser for MendelianPhaser {
    fn phase(&self, father: &str, mother: &str, child: &str) -> String {
        // unparseable parents carry no information
        let father: Genotype = father.parse().unwrap_or(Genotype::Missing);
        let mother: Genotype = mother.parse().unwrap_or(Genotype::Missing);
        let (a, b) = match child.parse::<Genotype>() {
            Ok(Genotype::Called(a, b)) => (a, b),
            // leave anything else untouched, the resolver decides if it is usable
            _ => return child.to_string()
        };

        let a_then_b = Self::can_transmit(father, a) && Self::can_transmit(mother, b);
        let b_then_a = Self::can_transmit(father, b) && Self::can_transmit(mother, a);
        let informative = !father.is_missing() || !mother.is_missing();

        if a == b {
            if a_then_b && informative {
                format!("{a}|{a}")
            } else {
                format!("{a}/{a}")
            }
        } else {
            match (a_then_b, b_then_a) {
                (true, false) => format!("{a}|{b}"),
                (false, true) => format!("{b}|{a}"),
                // ambiguous or a Mendelian violation
                _ => format!("{}/{}", a.min(b), a.max(b))
            }
        }
    }
}

/// Wraps a phasing routine and parses its output into a `PhaseCall`
pub struct PhaseResolver<P: TrioPhaser> {
    phaser: P
}

impl<P: TrioPhaser> PhaseResolver<P> {
    pub fn new(phaser: P) -> Self {
        Self { phaser }
    }

    /// Phases a gated trio genotype.
    /// # Errors
    /// * if the phasing routine returns a token that is not "<digit><sep><digit>"
    pub fn resolve(&self, genotypes: &PedigreeGenotype) -> Result<PhaseCall, PhaseError> {
        let [father, mother, child] = genotypes.as_strings();
        let token = self.phaser.phase(&father, &mother, &child);
        trace!("\tphase({father}, {mother}, {child}) = {token}");
        token.parse()
    }
}

impl Default for PhaseResolver<MendelianPhaser> {
    fn default() -> Self {
        Self::new(MendelianPhaser)
    }
}
