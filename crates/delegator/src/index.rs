//! Classification index built once per discovery cycle.
//!
//! Classification never recomputes trigger sets per request: the index is
//! precomputed from the skill catalog plus a configured entity directory,
//! and `classify` is a pure O(tokens) lookup. Tie-breaking is fully
//! deterministic: entity-backed matches beat keyword matches, longer
//! trigger matches beat shorter ones, and catalog order settles the rest.

use serde_json::{Map, Value};

use skillbridge_core::types::{IncomingRequest, ParamType, RoutingDecision, SkillDescriptor};

/// Words too generic to act as routing triggers.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "for", "with", "from", "into", "that", "this", "are", "is",
    "was", "will", "can", "could", "please", "what", "when", "where", "how", "does", "do", "have",
    "has", "you", "your", "all", "any", "together",
];

pub struct ClassificationIndex {
    skills: Vec<SkillDescriptor>,
    /// (trigger, skill index), longest-first is not presorted; classify
    /// scans and keeps the longest match.
    triggers: Vec<(String, usize)>,
    /// Indices of skills that accept an entity-valued parameter.
    entity_skills: Vec<usize>,
    /// Known entity names, original casing preserved for extraction.
    entities: Vec<String>,
    /// Parameter names an entity value may fill.
    entity_params: Vec<String>,
}

impl ClassificationIndex {
    /// Build the index from a skill catalog and the entity directory.
    pub fn build(skills: Vec<SkillDescriptor>, entities: &[String], entity_params: &[String]) -> Self {
        let mut triggers = Vec::new();
        let mut entity_skills = Vec::new();

        for (idx, skill) in skills.iter().enumerate() {
            // The whole name as a phrase trigger ("apply_leave" matches
            // "apply leave"), then its parts, then description words.
            let phrase = skill.name.replace('_', " ").to_lowercase();
            if !phrase.is_empty() {
                triggers.push((phrase, idx));
            }

            for part in skill.name.to_lowercase().split('_') {
                if part.len() >= 3 && !STOPWORDS.contains(&part) {
                    triggers.push((part.to_string(), idx));
                }
            }

            for word in normalize(&skill.description).split_whitespace() {
                if word.len() >= 4 && !STOPWORDS.contains(&word) {
                    triggers.push((word.to_string(), idx));
                }
            }

            if skill
                .parameters
                .iter()
                .any(|p| entity_params.iter().any(|ep| ep == &p.name))
            {
                entity_skills.push(idx);
            }
        }

        triggers.sort();
        triggers.dedup();

        Self {
            skills,
            triggers,
            entity_skills,
            entities: entities.to_vec(),
            entity_params: entity_params.to_vec(),
        }
    }

    /// An index over an empty catalog routes everything locally.
    pub fn empty() -> Self {
        Self::build(Vec::new(), &[], &[])
    }

    /// The catalog the index was built from, in catalog order.
    pub fn skills(&self) -> &[SkillDescriptor] {
        &self.skills
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Classify a request into a routing decision.
    pub fn classify(&self, request: &IncomingRequest) -> RoutingDecision {
        let normalized = normalize(&request.message);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        let entity = request.entity.clone().or_else(|| {
            self.entities
                .iter()
                .find(|e| tokens.iter().any(|t| *t == e.to_lowercase()))
                .cloned()
        });

        // Entity matches are strong signals: if the request names a known
        // entity and some skill accepts it as an argument, delegation is
        // forced and the candidate set narrows to those skills.
        let candidates: Vec<usize> = match (&entity, self.entity_skills.is_empty()) {
            (Some(_), false) => self.entity_skills.clone(),
            _ => (0..self.skills.len()).collect(),
        };
        let entity_backed = entity.is_some() && !self.entity_skills.is_empty();

        let mut best: Option<(usize, usize)> = None; // (trigger len, skill idx)
        for &idx in &candidates {
            let len = self.longest_trigger_match(idx, &normalized);
            if len == 0 {
                continue;
            }
            let better = match best {
                Some((best_len, best_idx)) => len > best_len || (len == best_len && idx < best_idx),
                None => true,
            };
            if better {
                best = Some((len, idx));
            }
        }

        let chosen = match best {
            Some((_, idx)) => Some(idx),
            // Entity with no keyword still delegates, to the first
            // entity-accepting skill in catalog order.
            None if entity_backed => self.entity_skills.first().copied(),
            None => None,
        };

        match chosen {
            Some(idx) => {
                let skill = &self.skills[idx];
                let arguments = self.extract_arguments(skill, request, &tokens, entity.as_deref());
                RoutingDecision::Delegate {
                    skill_id: skill.id.clone(),
                    arguments,
                }
            }
            None => RoutingDecision::Local,
        }
    }

    fn longest_trigger_match(&self, idx: usize, normalized: &str) -> usize {
        self.triggers
            .iter()
            .filter(|(_, i)| *i == idx)
            .filter(|(trigger, _)| normalized.contains(trigger.as_str()))
            .map(|(trigger, _)| trigger.len())
            .max()
            .unwrap_or(0)
    }

    /// Fill the chosen skill's arguments from the request.
    ///
    /// Order of precedence: the matched entity fills entity-valued
    /// parameters, date-shaped tokens fill a date-named parameter, integer
    /// tokens fill numeric parameters in declared order, and a sole
    /// remaining required string parameter receives the raw message.
    fn extract_arguments(
        &self,
        skill: &SkillDescriptor,
        request: &IncomingRequest,
        tokens: &[&str],
        entity: Option<&str>,
    ) -> Map<String, Value> {
        let mut args = Map::new();

        if let Some(entity) = entity {
            for param in &skill.parameters {
                if self.entity_params.iter().any(|ep| ep == &param.name) {
                    args.insert(param.name.clone(), Value::String(entity.to_string()));
                }
            }
        }

        let dates = extract_dates(&request.message);
        if !dates.is_empty() {
            if let Some(param) = skill.parameters.iter().find(|p| {
                p.required
                    && p.param_type == ParamType::String
                    && p.name.contains("date")
                    && !args.contains_key(&p.name)
            }) {
                args.insert(param.name.clone(), Value::String(dates.join(",")));
            }
        }

        let mut integers = tokens.iter().filter_map(|t| t.parse::<i64>().ok());
        for param in &skill.parameters {
            if args.contains_key(&param.name) {
                continue;
            }
            if matches!(param.param_type, ParamType::Integer | ParamType::Number) {
                if let Some(value) = integers.next() {
                    args.insert(param.name.clone(), Value::from(value));
                }
            }
        }

        let unfilled_required_strings: Vec<&str> = skill
            .parameters
            .iter()
            .filter(|p| {
                p.required && p.param_type == ParamType::String && !args.contains_key(&p.name)
            })
            .map(|p| p.name.as_str())
            .collect();
        if let [sole] = unfilled_required_strings.as_slice() {
            args.insert(sole.to_string(), Value::String(request.message.clone()));
        }

        args
    }
}

/// Lowercase and strip punctuation, collapsing to space-separated tokens.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pull `YYYY-MM-DD`-shaped tokens out of the raw message.
fn extract_dates(message: &str) -> Vec<String> {
    message
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|t| t.trim_matches(|c: char| !c.is_ascii_digit() && c != '-'))
        .filter(|t| is_date_shaped(t))
        .map(|t| t.to_string())
        .collect()
}

fn is_date_shaped(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
}
