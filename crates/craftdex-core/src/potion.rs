//! Potion brewing rules and their resolution.
//!
//! This module provides:
//! - Potion definitions with per-variant effect profiles
//! - Partial potion filters where an unset field is a wildcard
//! - Brewing rules mapping (ingredient, potion) filters to outputs
//! - `PotionRuleResolver`, which evaluates a partial query against every rule
//!
//! Results are keyed by `(potion id, form, variant)`. A later rule producing
//! an existing key replaces the earlier instance in place.

use ahash::AHashMap;
use craftdex_common::{CraftdexError, CraftdexResult, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, trace};

// ============================================================================
// Forms, variants, effects
// ============================================================================

/// How a potion is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotionForm {
    /// Drinkable.
    #[default]
    Normal,
    /// Thrown, instant area effect.
    Splash,
    /// Thrown, lingering cloud.
    Lingering,
}

impl PotionForm {
    /// Lowercase name as used in data files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Splash => "splash",
            Self::Lingering => "lingering",
        }
    }
}

impl FromStr for PotionForm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "splash" => Ok(Self::Splash),
            "lingering" => Ok(Self::Lingering),
            _ => Err(ValidationError::InvalidValue {
                field: "form",
                value: s.to_string(),
            }),
        }
    }
}

/// Strength/duration variant of a potion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotionVariant {
    /// Unmodified.
    #[default]
    Base,
    /// Extended duration.
    Longer,
    /// Increased potency.
    Stronger,
}

impl PotionVariant {
    /// Lowercase name as used in data files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Longer => "longer",
            Self::Stronger => "stronger",
        }
    }
}

impl FromStr for PotionVariant {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "longer" => Ok(Self::Longer),
            "stronger" => Ok(Self::Stronger),
            _ => Err(ValidationError::InvalidValue {
                field: "variant",
                value: s.to_string(),
            }),
        }
    }
}

/// A single status effect applied by a potion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotionEffect {
    /// Effect name.
    pub name: String,
    /// Effect level.
    pub level: u32,
}

/// Effect profile of one potion variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectVariant {
    /// Duration in seconds (0 for instant or no effect).
    pub duration: u32,
    /// Tooltip text.
    #[serde(default)]
    pub description: String,
    /// Effects applied.
    #[serde(default)]
    pub applies: Vec<PotionEffect>,
}

impl EffectVariant {
    /// Zero-duration profile used when a potion defines none.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }
}

/// Effect profiles keyed by variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotionVariants {
    /// Base profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<EffectVariant>,
    /// Extended profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longer: Option<EffectVariant>,
    /// Amplified profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stronger: Option<EffectVariant>,
}

impl PotionVariants {
    /// Profile for a variant, if defined.
    #[must_use]
    pub fn get(&self, variant: PotionVariant) -> Option<&EffectVariant> {
        match variant {
            PotionVariant::Base => self.base.as_ref(),
            PotionVariant::Longer => self.longer.as_ref(),
            PotionVariant::Stronger => self.stronger.as_ref(),
        }
    }
}

// ============================================================================
// Potions and instances
// ============================================================================

/// Whether a potion is a brewing base or carries an effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotionKind {
    /// Water, awkward, mundane, thick.
    Base,
    /// Any potion with a status effect.
    #[default]
    Effect,
}

/// Catalog definition of a potion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Potion {
    /// Identifier (e.g. `healing`).
    pub id: String,
    /// Internal name.
    pub name: String,
    /// Human readable name; falls back to `name` when empty.
    #[serde(default)]
    pub display_name: String,
    /// Liquid color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Base or effect potion.
    #[serde(rename = "type", default)]
    pub kind: PotionKind,
    /// Effect profiles.
    #[serde(default)]
    pub variants: PotionVariants,
    /// Potion produced when corrupted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrupt_to: Option<String>,
}

impl Potion {
    /// Create a potion with no effect profiles.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: PotionKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: String::new(),
            color: None,
            kind,
            variants: PotionVariants::default(),
            corrupt_to: None,
        }
    }

    /// Set a variant's effect profile.
    #[must_use]
    pub fn with_variant(mut self, variant: PotionVariant, effect: EffectVariant) -> Self {
        let slot = match variant {
            PotionVariant::Base => &mut self.variants.base,
            PotionVariant::Longer => &mut self.variants.longer,
            PotionVariant::Stronger => &mut self.variants.stronger,
        };
        *slot = Some(effect);
        self
    }

    /// Set the corruption target.
    #[must_use]
    pub fn with_corrupt_to(mut self, target: impl Into<String>) -> Self {
        self.corrupt_to = Some(target.into());
        self
    }

    /// Display name, or the internal name when none is set.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    fn instance(
        &self,
        form: PotionForm,
        variant: PotionVariant,
        effect: EffectVariant,
    ) -> PotionInstance {
        PotionInstance {
            id: self.id.clone(),
            name: self.name.clone(),
            display_name: self.display_name().to_string(),
            form,
            variant,
            color: self.color.clone(),
            effect: Some(effect),
        }
    }
}

/// A concrete potion state produced by brewing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotionInstance {
    /// Potion identifier.
    pub id: String,
    /// Internal name.
    pub name: String,
    /// Human readable name.
    pub display_name: String,
    /// Delivery form.
    pub form: PotionForm,
    /// Strength variant.
    pub variant: PotionVariant,
    /// Liquid color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Effect profile for this variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<EffectVariant>,
}

type InstanceKey = (String, PotionForm, PotionVariant);

impl PotionInstance {
    fn key(&self) -> InstanceKey {
        (self.id.clone(), self.form, self.variant)
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Partially specified potion state. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotionFilter {
    /// Potion id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Delivery form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<PotionForm>,
    /// Strength variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<PotionVariant>,
}

impl PotionFilter {
    /// Filter on a potion id.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the form.
    #[must_use]
    pub const fn with_form(mut self, form: PotionForm) -> Self {
        self.form = Some(form);
        self
    }

    /// Set the variant.
    #[must_use]
    pub const fn with_variant(mut self, variant: PotionVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Check if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.form.is_none() && self.variant.is_none()
    }
}

/// What a brewing step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// Water into a base potion.
    CreateBase,
    /// Base potion into an effect potion.
    CreateEffect,
    /// Effect potion into its longer variant.
    ExtendDuration,
    /// Effect potion into its stronger variant.
    IncreasePower,
    /// Effect potion into its corrupted counterpart.
    Corrupt,
    /// Normal potion into splash or lingering.
    ConvertForm,
}

/// A brewing rule: an optional ingredient plus an input filter mapped to an
/// output filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrewingRule {
    /// Ingredient item name; unset matches any ingredient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<String>,
    /// Potion state the rule consumes.
    #[serde(default)]
    pub input: PotionFilter,
    /// Potion state the rule produces.
    #[serde(default)]
    pub output: PotionFilter,
    /// Modifier kind.
    #[serde(rename = "type")]
    pub kind: ModifierKind,
}

impl BrewingRule {
    /// Create a rule.
    #[must_use]
    pub fn new(
        ingredient_id: Option<&str>,
        input: PotionFilter,
        output: PotionFilter,
        kind: ModifierKind,
    ) -> Self {
        Self {
            ingredient_id: ingredient_id.map(str::to_string),
            input,
            output,
            kind,
        }
    }

    /// Check the rule against a query. A field only constrains when both the
    /// rule and the query set it.
    #[must_use]
    pub fn accepts(&self, ingredient: Option<&str>, query: &PotionFilter) -> bool {
        field_matches(self.ingredient_id.as_deref(), ingredient)
            && field_matches(self.input.name.as_deref(), query.name.as_deref())
            && field_matches(self.input.variant.as_ref(), query.variant.as_ref())
            && field_matches(self.input.form.as_ref(), query.form.as_ref())
    }
}

fn field_matches<T: PartialEq + ?Sized>(rule: Option<&T>, query: Option<&T>) -> bool {
    match (rule, query) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => true,
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Insert-or-replace list that keeps the position of each key's first
/// insertion.
#[derive(Debug, Default)]
struct InstanceSet {
    instances: Vec<PotionInstance>,
    positions: AHashMap<InstanceKey, usize>,
}

impl InstanceSet {
    fn put(&mut self, instance: PotionInstance) {
        match self.positions.get(&instance.key()) {
            Some(&pos) => self.instances[pos] = instance,
            None => {
                self.positions.insert(instance.key(), self.instances.len());
                self.instances.push(instance);
            },
        }
    }

    fn into_vec(self) -> Vec<PotionInstance> {
        self.instances
    }
}

/// Evaluates partial brewing queries against the rule table.
#[derive(Debug, Default)]
pub struct PotionRuleResolver {
    potions: Vec<Potion>,
    by_id: AHashMap<String, usize>,
    rules: Vec<BrewingRule>,
}

impl PotionRuleResolver {
    /// Build a resolver. Duplicate potion ids are rejected.
    pub fn new(potions: Vec<Potion>, rules: Vec<BrewingRule>) -> CraftdexResult<Self> {
        let mut by_id = AHashMap::with_capacity(potions.len());
        for (pos, potion) in potions.iter().enumerate() {
            if by_id.insert(potion.id.clone(), pos).is_some() {
                return Err(CraftdexError::Catalog(format!(
                    "duplicate potion id {}",
                    potion.id
                )));
            }
        }

        info!(
            "Potion resolver built: {} potions, {} rules",
            potions.len(),
            rules.len()
        );
        Ok(Self {
            potions,
            by_id,
            rules,
        })
    }

    /// Get a potion by id.
    #[must_use]
    pub fn potion(&self, id: &str) -> Option<&Potion> {
        self.by_id.get(id).map(|&pos| &self.potions[pos])
    }

    /// All potions in catalog order.
    #[must_use]
    pub fn potions(&self) -> &[Potion] {
        &self.potions
    }

    /// All rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[BrewingRule] {
        &self.rules
    }

    /// Distinct ingredient ids referenced by rules, in rule order.
    #[must_use]
    pub fn ingredients(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for id in self.rules.iter().filter_map(|r| r.ingredient_id.as_deref()) {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }

    /// Every potion instance the matching rules can produce.
    ///
    /// At least one of `ingredient` and a query field must be given.
    pub fn resolve(
        &self,
        ingredient: Option<&str>,
        query: &PotionFilter,
    ) -> CraftdexResult<Vec<PotionInstance>> {
        if ingredient.is_none() && query.is_empty() {
            return Err(ValidationError::MissingParameter("ingredientId or potion").into());
        }

        let mut results = InstanceSet::default();
        for (pos, rule) in self.rules.iter().enumerate() {
            if !rule.accepts(ingredient, query) {
                trace!("Brewing rule {} rejected", pos);
                continue;
            }
            trace!("Brewing rule {} ({:?}) accepted", pos, rule.kind);
            self.emit(rule, query, &mut results);
        }

        let results = results.into_vec();
        debug!(
            "Resolved {} potion instances for ingredient {:?}",
            results.len(),
            ingredient
        );
        Ok(results)
    }

    fn emit(&self, rule: &BrewingRule, query: &PotionFilter, out: &mut InstanceSet) {
        let output = &rule.output;

        if let (Some(name), None, None) = (&output.name, output.form, output.variant) {
            match self.potion(name) {
                Some(potion) => {
                    let effect = potion
                        .variants
                        .base
                        .clone()
                        .unwrap_or_else(EffectVariant::placeholder);
                    out.put(potion.instance(PotionForm::Normal, PotionVariant::Base, effect));
                },
                None => debug!("Brewing rule names unknown potion {}", name),
            }
        } else if let Some(variant) = output.variant {
            let form = query.form.unwrap_or_default();
            for potion in self.candidates(rule, query) {
                if let Some(effect) = potion.variants.get(variant) {
                    out.put(potion.instance(form, variant, effect.clone()));
                }
            }
        } else if let Some(form) = output.form {
            let variant = query.variant.unwrap_or_default();
            for potion in self.candidates(rule, query) {
                if let Some(effect) = potion.variants.get(variant) {
                    out.put(potion.instance(form, variant, effect.clone()));
                }
            }
        } else if rule.kind == ModifierKind::Corrupt {
            let form = query.form.unwrap_or_default();
            let variant = query.variant.unwrap_or_default();
            for potion in self.candidates(rule, query) {
                let Some(target) = potion.corrupt_to.as_deref().and_then(|id| self.potion(id))
                else {
                    continue;
                };
                if let Some(effect) = target.variants.get(variant) {
                    out.put(target.instance(form, variant, effect.clone()));
                }
            }
        }
    }

    /// Potions selected by the query's and the rule's input names.
    fn candidates<'a>(
        &'a self,
        rule: &'a BrewingRule,
        query: &'a PotionFilter,
    ) -> impl Iterator<Item = &'a Potion> + 'a {
        self.potions.iter().filter(move |potion| {
            field_matches(Some(potion.id.as_str()), query.name.as_deref())
                && field_matches(Some(potion.id.as_str()), rule.input.name.as_deref())
        })
    }
}
