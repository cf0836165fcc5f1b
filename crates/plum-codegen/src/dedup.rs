//! Collapse structurally identical nested models and give the survivors
//! short, unique class names.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::naming::{content_hash, parse_parent_path_name};
use crate::types::{ModelKind, Param, RequestData, RequestModel};

/// Rewrite `data` so every nested model is named by its local type name
/// (suffixed on collision) and identical shapes appear once.
pub fn deduplicate(data: RequestData) -> RequestData {
    let RequestData {
        method_name,
        request_name,
        params,
        responses,
        comments,
    } = data;

    let mut pass = Pass::default();
    // Root names are final as given.
    for model in params.iter().chain(responses.iter()) {
        if model.parent_model_type != ModelKind::Child {
            pass.taken.insert(model.class_name.clone());
        }
    }

    let params = pass.run(params);
    let responses = pass.run(responses);

    let out = RequestData {
        method_name,
        request_name,
        params,
        responses,
        comments,
    };
    for missing in unresolved_refs(&out) {
        warn!(model = %missing, "reference to unknown model after dedup");
    }
    out
}

/// Model names referenced by some field but defined nowhere.
pub fn unresolved_refs(data: &RequestData) -> Vec<String> {
    let defined: HashSet<&str> = data.models().map(|m| m.class_name.as_str()).collect();
    let mut missing: Vec<String> = Vec::new();
    for model in data.models() {
        for param in &model.child_params {
            for r in param.model_refs() {
                if !defined.contains(r) && !missing.iter().any(|m| m == r) {
                    missing.push(r.to_string());
                }
            }
        }
    }
    missing
}

#[derive(Default)]
struct Pass {
    /// Old class name → final class name.
    renames: HashMap<String, String>,
    /// (local name, hash) → final class name of the survivor.
    survivors: HashMap<(String, String), String>,
    /// Next suffix to try per local name.
    next_suffix: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl Pass {
    fn run(&mut self, models: Vec<RequestModel>) -> Vec<RequestModel> {
        let mut out = Vec::with_capacity(models.len());
        for mut model in models {
            for param in &mut model.child_params {
                self.rewrite(param);
            }

            if model.parent_model_type != ModelKind::Child {
                out.push(model);
                continue;
            }

            let local = parse_parent_path_name(&model.class_name).to_string();
            let hash = fingerprint(&local, &model.child_params);
            let key = (local.clone(), hash);

            if let Some(survivor) = self.survivors.get(&key) {
                debug!(from = %model.class_name, to = %survivor, "unified identical model");
                self.renames.insert(model.class_name, survivor.clone());
                continue;
            }

            let name = self.claim(&local);
            debug!(from = %model.class_name, to = %name, "named model");
            self.survivors.insert(key, name.clone());
            self.renames.insert(model.class_name.clone(), name.clone());
            model.class_name = name;
            out.push(model);
        }
        out
    }

    fn rewrite(&self, param: &mut Param) {
        if let Some(new) = self.renames.get(&param.type_name) {
            param.type_name = new.clone();
        }
        if let Some(child) = param.child_type.as_mut()
            && let Some(new) = self.renames.get(child.as_str())
        {
            *child = new.clone();
        }
    }

    /// First free name among `local`, `local1`, `local2`, ...
    fn claim(&mut self, local: &str) -> String {
        let counter = self.next_suffix.entry(local.to_string()).or_insert(0);
        loop {
            let candidate = if *counter == 0 {
                local.to_string()
            } else {
                format!("{local}{counter}")
            };
            *counter += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

fn fingerprint(local: &str, params: &[Param]) -> String {
    let mut text = local.to_string();
    for p in params {
        text.push('\n');
        text.push_str(&p.name);
        text.push('|');
        text.push_str(&p.type_name);
        text.push('|');
        text.push_str(p.child_type.as_deref().unwrap_or(""));
        text.push('|');
        text.push_str(if p.required { "1" } else { "0" });
    }
    content_hash(&text)
}
