use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use crate::core::MatchingError;

/// Personality survey scores used to derive roommate preferences
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extraversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
    pub cleanliness: f64,
    pub noise: f64,
}

impl Attributes {
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.openness,
            self.conscientiousness,
            self.extraversion,
            self.agreeableness,
            self.neuroticism,
            self.cleanliness,
            self.noise,
        ]
    }
}

impl From<[f64; 7]> for Attributes {
    fn from(scores: [f64; 7]) -> Self {
        let [openness, conscientiousness, extraversion, agreeableness, neuroticism, cleanliness, noise] = scores;
        Self {
            openness,
            conscientiousness,
            extraversion,
            agreeableness,
            neuroticism,
            cleanliness,
            noise,
        }
    }
}

/// A participant looking for a roommate
///
/// Identity is the key alone: two participants with the same key are the
/// same participant regardless of name or scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub attributes: Attributes,
}

impl Participant {
    pub fn new(key: impl Into<String>, name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            attributes,
        }
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Participant {}

impl Hash for Participant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// One roommate pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub first: String,
    pub second: String,
}

/// Final roommate assignment: every participant mapped to its partner
///
/// Symmetric by construction, `partner_of(a) == Some(b)` iff
/// `partner_of(b) == Some(a)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Matching {
    partners: BTreeMap<String, String>,
}

impl Matching {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_partners(partners: BTreeMap<String, String>) -> Self {
        Self { partners }
    }

    /// Build a matching from explicit pairs
    ///
    /// Fails if a participant is paired with itself or appears twice.
    pub fn from_pairs<K, I>(pairs: I) -> Result<Self, MatchingError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, K)>,
    {
        let mut partners = BTreeMap::new();
        for (a, b) in pairs {
            let (a, b): (String, String) = (a.into(), b.into());
            if a == b {
                return Err(MatchingError::malformed(format!("{} cannot be paired with itself", a)));
            }
            if partners.contains_key(&a) || partners.contains_key(&b) {
                return Err(MatchingError::malformed(format!("{} or {} is already paired", a, b)));
            }
            partners.insert(a.clone(), b.clone());
            partners.insert(b, a);
        }
        Ok(Self { partners })
    }

    pub fn partner_of(&self, key: &str) -> Option<&str> {
        self.partners.get(key).map(String::as_str)
    }

    /// Number of matched participants (twice the number of pairs)
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.partners.keys().map(String::as_str)
    }

    /// Each pair once, lower key first, ordered by key
    pub fn pairs(&self) -> Vec<MatchedPair> {
        self.partners
            .iter()
            .filter(|(key, partner)| key < partner)
            .map(|(key, partner)| MatchedPair {
                first: key.clone(),
                second: partner.clone(),
            })
            .collect()
    }

    pub fn is_symmetric(&self) -> bool {
        self.partners
            .iter()
            .all(|(key, partner)| key != partner && self.partner_of(partner) == Some(key.as_str()))
    }

    /// Pairs who both prefer each other over their assigned partners
    ///
    /// Brute-force O(N²) scan against the given preference lists; pairs
    /// involving unmatched participants are not reported.
    pub fn blocking_pairs<K: AsRef<str>>(&self, preferences: &[(K, Vec<K>)]) -> Vec<(String, String)> {
        let ranks: HashMap<&str, HashMap<&str, usize>> = preferences
            .iter()
            .map(|(key, ranked)| {
                let positions: HashMap<&str, usize> = ranked
                    .iter()
                    .enumerate()
                    .map(|(rank, other)| (other.as_ref(), rank))
                    .collect();
                (key.as_ref(), positions)
            })
            .collect();

        let prefers = |who: &str, candidate: &str| -> bool {
            let (Some(partner), Some(rank)) = (self.partner_of(who), ranks.get(who)) else {
                return false;
            };
            match (rank.get(candidate), rank.get(partner)) {
                (Some(candidate_rank), Some(partner_rank)) => candidate_rank < partner_rank,
                _ => false,
            }
        };

        let mut blocking = Vec::new();
        for (a, _) in preferences {
            for (b, _) in preferences {
                let (a, b) = (a.as_ref(), b.as_ref());
                if a < b && self.partner_of(a) != Some(b) && prefers(a, b) && prefers(b, a) {
                    blocking.push((a.to_string(), b.to_string()));
                }
            }
        }
        blocking
    }

    /// True when every listed participant is matched and no pair blocks
    pub fn is_stable_under<K: AsRef<str>>(&self, preferences: &[(K, Vec<K>)]) -> bool {
        self.len() == preferences.len()
            && preferences.iter().all(|(key, _)| self.partner_of(key.as_ref()).is_some())
            && self.is_symmetric()
            && self.blocking_pairs(preferences).is_empty()
    }
}
