use rustc_hash::FxHashMap;

/// Named morph targets of one mesh and their current influences.
///
/// Influences are kept in `[0, 1]`. `defaults` are the values the mesh was
/// loaded with; animation blends start from them and the mixer restores them
/// once no clip drives a target.
#[derive(Debug, Clone, Default)]
pub struct MorphTargets {
    names: Vec<String>,
    dictionary: FxHashMap<String, usize>,
    influences: Vec<f32>,
    defaults: Vec<f32>,
}

impl MorphTargets {
    /// Builds targets from `(name, initial influence)` pairs, in mesh order.
    ///
    /// A repeated name keeps its first index in the dictionary.
    #[must_use]
    pub fn new(targets: impl IntoIterator<Item = (String, f32)>) -> Self {
        let mut morph = Self::default();
        for (name, influence) in targets {
            let index = morph.names.len();
            morph.dictionary.entry(name.clone()).or_insert(index);
            morph.names.push(name);
            let influence = influence.clamp(0.0, 1.0);
            morph.influences.push(influence);
            morph.defaults.push(influence);
        }
        morph
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.dictionary.get(name).copied()
    }

    #[must_use]
    pub fn influences(&self) -> &[f32] {
        &self.influences
    }

    #[must_use]
    pub fn influence(&self, index: usize) -> Option<f32> {
        self.influences.get(index).copied()
    }

    #[must_use]
    pub fn default_influence(&self, index: usize) -> f32 {
        self.defaults.get(index).copied().unwrap_or(0.0)
    }

    /// Sets influence `index`, clamped to `[0, 1]`. Returns `false` when out of range.
    pub fn set_influence(&mut self, index: usize, value: f32) -> bool {
        match self.influences.get_mut(index) {
            Some(slot) => {
                *slot = value.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    /// Makes the current influence of `index` the value restored after animation.
    pub fn commit_default(&mut self, index: usize) {
        if let (Some(slot), Some(&value)) = (self.defaults.get_mut(index), self.influences.get(index)) {
            *slot = value;
        }
    }

    pub fn restore_default(&mut self, index: usize) {
        if let (Some(slot), Some(&value)) = (self.influences.get_mut(index), self.defaults.get(index)) {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_and_clamping() {
        let mut morph = MorphTargets::new([("Smile".to_string(), 0.25), ("Blink".to_string(), 2.0)]);
        assert_eq!(morph.index_of("Blink"), Some(1));
        assert_eq!(morph.influence(1), Some(1.0));

        assert!(morph.set_influence(0, -1.0));
        assert_eq!(morph.influence(0), Some(0.0));
        assert!(!morph.set_influence(5, 0.5));

        morph.restore_default(0);
        assert_eq!(morph.influence(0), Some(0.25));
    }
}
