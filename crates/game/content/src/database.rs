//! Validated, resolved content.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use gameplay_core::{
    AbilityDef, AbilityKind, AttributeDef, AttributeProfile, EffectDef, EffectDuration,
    ErrorSeverity, GameError, Modifier, TagError, TagId, TagQuery, TagQueryExpr, TagRegistry,
};
use thiserror::Error;

use crate::specs::{AbilitySpec, AttributeSpec, ContentSpecs, EffectSpec, ProfileSpec};

/// Dangling or inconsistent references in content.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    #[error("{owner}: {source}")]
    Tag {
        owner: String,
        #[source]
        source: TagError,
    },

    #[error("{owner}: unknown attribute '{attribute}'")]
    UnknownAttribute { owner: String, attribute: String },

    #[error("{owner}: unknown effect '{effect}'")]
    UnknownEffect { owner: String, effect: String },

    #[error("profile '{profile}': unknown parent '{parent}'")]
    UnknownParent { profile: String, parent: String },

    #[error("profile inheritance cycle through '{0}'")]
    ProfileCycle(String),

    #[error("attribute cap cycle through '{0}'")]
    CapCycle(String),

    #[error("duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },

    #[error("{owner}: {field} must be a finite number, got {value}")]
    NonFinite {
        owner: String,
        field: &'static str,
        value: f32,
    },
}

impl GameError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Tag { .. } => "CONTENT_TAG",
            Self::UnknownAttribute { .. } => "CONTENT_UNKNOWN_ATTRIBUTE",
            Self::UnknownEffect { .. } => "CONTENT_UNKNOWN_EFFECT",
            Self::UnknownParent { .. } => "CONTENT_UNKNOWN_PARENT",
            Self::ProfileCycle(_) => "CONTENT_PROFILE_CYCLE",
            Self::CapCycle(_) => "CONTENT_CAP_CYCLE",
            Self::Duplicate { .. } => "CONTENT_DUPLICATE",
            Self::NonFinite { .. } => "CONTENT_NON_FINITE",
        }
    }
}

pub type ContentResult<T> = Result<T, ContentError>;

/// Tag registry plus every definition, keyed by name.
///
/// Attribute lookups are case-insensitive; everything else is exact.
#[derive(Debug, Default)]
pub struct ContentDatabase {
    registry: TagRegistry,
    attributes: BTreeMap<String, Arc<AttributeDef>>,
    profiles: BTreeMap<String, Arc<AttributeProfile>>,
    effects: BTreeMap<String, Arc<EffectDef>>,
    abilities: BTreeMap<String, Arc<AbilityDef>>,
}

impl ContentDatabase {
    /// Validates specs and resolves every cross reference.
    pub fn build(specs: &ContentSpecs) -> ContentResult<Self> {
        let registry = TagRegistry::from_paths(specs.tags.tags.iter()).map_err(|source| {
            ContentError::Tag {
                owner: "tag catalog".to_string(),
                source,
            }
        })?;

        let mut db = Self {
            registry,
            ..Self::default()
        };
        db.resolve_attributes(&specs.attributes.attributes)?;
        db.resolve_profiles(&specs.profiles.profiles)?;
        for spec in &specs.effects.effects {
            let effect = db.resolve_effect(spec)?;
            insert_unique(&mut db.effects, "effect", spec.name.clone(), effect)?;
        }
        for spec in &specs.abilities.abilities {
            let ability = db.resolve_ability(spec)?;
            insert_unique(&mut db.abilities, "ability", spec.name.clone(), ability)?;
        }

        tracing::debug!(
            target: "gameplay::content",
            tags = db.registry.len(),
            attributes = db.attributes.len(),
            profiles = db.profiles.len(),
            effects = db.effects.len(),
            abilities = db.abilities.len(),
            "content resolved"
        );
        Ok(db)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn tag(&self, path: &str) -> Option<TagId> {
        self.registry.id_of(path)
    }

    pub fn attribute(&self, id: &str) -> Option<&Arc<AttributeDef>> {
        self.attributes.get(&id.to_ascii_lowercase())
    }

    pub fn profile(&self, name: &str) -> Option<&Arc<AttributeProfile>> {
        self.profiles.get(name)
    }

    pub fn effect(&self, name: &str) -> Option<&Arc<EffectDef>> {
        self.effects.get(name)
    }

    pub fn ability(&self, name: &str) -> Option<&Arc<AbilityDef>> {
        self.abilities.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Arc<AttributeDef>> {
        self.attributes.values()
    }

    pub fn effect_names(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(String::as_str)
    }

    pub fn ability_names(&self) -> impl Iterator<Item = &str> {
        self.abilities.keys().map(String::as_str)
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Custom behavior names referenced by abilities, for host-side validation.
    pub fn custom_behaviors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.abilities
            .values()
            .filter_map(|ability| Some((ability.name.as_str(), ability.kind.custom_name()?)))
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    fn resolve_attributes(&mut self, specs: &[AttributeSpec]) -> ContentResult<()> {
        let mut by_key: HashMap<String, &AttributeSpec> = HashMap::new();
        for spec in specs {
            let key = spec.id.to_ascii_lowercase();
            if by_key.insert(key, spec).is_some() {
                return Err(ContentError::Duplicate {
                    kind: "attribute",
                    name: spec.id.clone(),
                });
            }
        }

        for spec in specs {
            let mut visiting = HashSet::new();
            self.resolve_attribute(spec, &by_key, &mut visiting)?;
        }
        Ok(())
    }

    /// Caps must exist before the attributes they cap, so resolve depth-first.
    fn resolve_attribute(
        &mut self,
        spec: &AttributeSpec,
        by_key: &HashMap<String, &AttributeSpec>,
        visiting: &mut HashSet<String>,
    ) -> ContentResult<Arc<AttributeDef>> {
        let key = spec.id.to_ascii_lowercase();
        if let Some(existing) = self.attributes.get(&key) {
            return Ok(Arc::clone(existing));
        }
        if !visiting.insert(key.clone()) {
            return Err(ContentError::CapCycle(spec.id.clone()));
        }

        let mut def = AttributeDef::new(&spec.id).with_default(spec.default_value);
        if let Some(name) = &spec.display_name {
            def = def.with_display_name(name);
        }
        if let Some(min) = spec.min {
            def = def.with_min(min);
        }
        if let Some(max) = spec.max {
            def = def.with_max(max);
        }
        if let Some(cap_id) = &spec.max_attribute {
            let cap_spec = by_key.get(&cap_id.to_ascii_lowercase()).ok_or_else(|| {
                ContentError::UnknownAttribute {
                    owner: format!("attribute '{}'", spec.id),
                    attribute: cap_id.clone(),
                }
            })?;
            let cap = self.resolve_attribute(cap_spec, by_key, visiting)?;
            def = def.with_max_attribute(cap);
        }

        let def = def.build();
        self.attributes.insert(key, Arc::clone(&def));
        Ok(def)
    }

    fn resolve_profiles(&mut self, specs: &[ProfileSpec]) -> ContentResult<()> {
        let mut by_name: HashMap<&str, &ProfileSpec> = HashMap::new();
        for spec in specs {
            if by_name.insert(spec.name.as_str(), spec).is_some() {
                return Err(ContentError::Duplicate {
                    kind: "profile",
                    name: spec.name.clone(),
                });
            }
        }

        for spec in specs {
            let mut visiting = HashSet::new();
            self.resolve_profile(spec, &by_name, &mut visiting)?;
        }
        Ok(())
    }

    fn resolve_profile(
        &mut self,
        spec: &ProfileSpec,
        by_name: &HashMap<&str, &ProfileSpec>,
        visiting: &mut HashSet<String>,
    ) -> ContentResult<Arc<AttributeProfile>> {
        if let Some(existing) = self.profiles.get(&spec.name) {
            return Ok(Arc::clone(existing));
        }
        if !visiting.insert(spec.name.clone()) {
            return Err(ContentError::ProfileCycle(spec.name.clone()));
        }

        let mut profile = AttributeProfile::new(&spec.name);
        if let Some(parent_name) = &spec.parent {
            let parent_spec =
                by_name
                    .get(parent_name.as_str())
                    .ok_or_else(|| ContentError::UnknownParent {
                        profile: spec.name.clone(),
                        parent: parent_name.clone(),
                    })?;
            let parent = self.resolve_profile(parent_spec, by_name, visiting)?;
            profile = profile.with_parent(parent);
        }
        for (attribute, value) in &spec.values {
            let def = self.require_attribute(&format!("profile '{}'", spec.name), attribute)?;
            profile.set(def, *value);
        }

        let profile = Arc::new(profile);
        self.profiles
            .insert(spec.name.clone(), Arc::clone(&profile));
        Ok(profile)
    }

    fn resolve_effect(&self, spec: &EffectSpec) -> ContentResult<Arc<EffectDef>> {
        let owner = format!("effect '{}'", spec.name);
        let duration = finite(&owner, "duration", spec.duration)?;
        let mut def = EffectDef::new(&spec.name, EffectDuration::from_seconds(duration));

        for modifier in &spec.modifiers {
            let attribute = self.require_attribute(&owner, &modifier.attribute)?;
            let value = finite(&owner, "modifier value", modifier.value)?;
            def = def.with_modifier(Modifier::new(attribute, modifier.op, value));
        }
        for path in &spec.grant_tags {
            def = def.granting(self.require_tag(&owner, path)?);
        }
        for path in &spec.remove_tags {
            def = def.removing(self.require_tag(&owner, path)?);
        }
        def = def
            .requiring(self.query(&owner, spec.require_tags.as_ref())?)
            .blocked_by(self.query(&owner, spec.block_tags.as_ref())?);
        if let Some(max_stacks) = spec.max_stacks {
            def = def.stacking(max_stacks);
        }
        if let Some(period) = spec.period {
            def = def.periodic(finite(&owner, "period", period)?);
        }
        Ok(def.build())
    }

    fn resolve_ability(&self, spec: &AbilitySpec) -> ContentResult<Arc<AbilityDef>> {
        let owner = format!("ability '{}'", spec.name);
        let kind = spec.kind.clone().unwrap_or(AbilityKind::Instant);
        match &kind {
            AbilityKind::Timed { duration } => {
                finite(&owner, "duration", *duration)?;
            }
            AbilityKind::Dash { speed, duration } => {
                finite(&owner, "dash speed", *speed)?;
                finite(&owner, "duration", *duration)?;
            }
            AbilityKind::Instant | AbilityKind::Channel | AbilityKind::Custom { .. } => {}
        }
        let mut def = AbilityDef::new(&spec.name, kind);

        if let Some(path) = &spec.tag {
            def = def.with_tag(self.require_tag(&owner, path)?);
        }
        if let Some(cost) = &spec.cost {
            let amount = finite(&owner, "cost", cost.amount)?;
            def = def.with_cost(self.require_attribute(&owner, &cost.attribute)?, amount);
        }
        if let Some(cooldown) = &spec.cooldown {
            let seconds = finite(&owner, "cooldown", cooldown.seconds)?;
            def = def.with_cooldown(seconds, self.require_tag(&owner, &cooldown.tag)?);
        }
        def = def
            .requiring(self.query(&owner, spec.require_tags.as_ref())?)
            .blocked_by(self.query(&owner, spec.blocked_by_tags.as_ref())?);
        for path in &spec.active_tags {
            def = def.granting_while_active(self.require_tag(&owner, path)?);
        }
        for name in &spec.on_activate {
            def = def.on_activate(self.require_effect(&owner, name)?);
        }
        for name in &spec.on_end {
            def = def.on_end(self.require_effect(&owner, name)?);
        }
        Ok(def.build())
    }

    fn require_tag(&self, owner: &str, path: &str) -> ContentResult<TagId> {
        self.registry.require(path).map_err(|source| ContentError::Tag {
            owner: owner.to_string(),
            source,
        })
    }

    fn require_attribute(&self, owner: &str, id: &str) -> ContentResult<Arc<AttributeDef>> {
        self.attribute(id)
            .cloned()
            .ok_or_else(|| ContentError::UnknownAttribute {
                owner: owner.to_string(),
                attribute: id.to_string(),
            })
    }

    fn require_effect(&self, owner: &str, name: &str) -> ContentResult<Arc<EffectDef>> {
        self.effect(name)
            .cloned()
            .ok_or_else(|| ContentError::UnknownEffect {
                owner: owner.to_string(),
                effect: name.to_string(),
            })
    }

    fn query(&self, owner: &str, expr: Option<&TagQueryExpr>) -> ContentResult<TagQuery> {
        TagQuery::from_expr(expr, &self.registry).map_err(|source| ContentError::Tag {
            owner: owner.to_string(),
            source,
        })
    }
}

/// Durations and amounts must be real numbers; NaN would never expire or compare.
fn finite(owner: &str, field: &'static str, value: f32) -> ContentResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ContentError::NonFinite {
            owner: owner.to_string(),
            field,
            value,
        })
    }
}

fn insert_unique<T>(
    map: &mut BTreeMap<String, Arc<T>>,
    kind: &'static str,
    name: String,
    value: Arc<T>,
) -> ContentResult<()> {
    if map.contains_key(&name) {
        return Err(ContentError::Duplicate { kind, name });
    }
    map.insert(name, value);
    Ok(())
}
