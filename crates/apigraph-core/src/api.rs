//! Whole-program registries.
//!
//! [`Api`] holds every entity of one run, keyed by id. Each per-file walk
//! produces an `Api` fragment; fragments are merged into the final model.
//! Registries are `BTreeMap`s so iteration (and therefore the output
//! document) is sorted by id.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::model::{
    Attribute, Class, Enum, EnumInstance, Function, FunctionResult, Module, Parameter,
};
use crate::mro::{compute_mro, MroError, MroResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Api {
    pub distribution: String,
    pub package: String,
    pub version: String,
    pub modules: BTreeMap<String, Module>,
    pub classes: BTreeMap<String, Class>,
    pub functions: BTreeMap<String, Function>,
    pub parameters: BTreeMap<String, Parameter>,
    pub attributes: BTreeMap<String, Attribute>,
    pub results: BTreeMap<String, FunctionResult>,
    pub enums: BTreeMap<String, Enum>,
    pub enum_instances: BTreeMap<String, EnumInstance>,
}

/// Insert `value` under `id` unless the id is taken. Returns false on collision.
fn insert_first<T>(registry: &mut BTreeMap<String, T>, kind: &str, id: String, value: T) -> bool {
    if registry.contains_key(&id) {
        debug!(kind, id = %id, "duplicate id, keeping first definition");
        return false;
    }
    registry.insert(id, value);
    true
}

impl Api {
    pub fn new(
        distribution: impl Into<String>,
        package: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Api {
            distribution: distribution.into(),
            package: package.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    pub fn add_module(&mut self, module: Module) -> bool {
        insert_first(&mut self.modules, "module", module.id.clone(), module)
    }

    pub fn add_class(&mut self, class: Class) -> bool {
        insert_first(&mut self.classes, "class", class.id.clone(), class)
    }

    pub fn add_function(&mut self, function: Function) -> bool {
        insert_first(&mut self.functions, "function", function.id.clone(), function)
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> bool {
        insert_first(&mut self.parameters, "parameter", parameter.id.clone(), parameter)
    }

    pub fn add_attribute(&mut self, attribute: Attribute) -> bool {
        insert_first(&mut self.attributes, "attribute", attribute.id.clone(), attribute)
    }

    pub fn add_result(&mut self, result: FunctionResult) -> bool {
        insert_first(&mut self.results, "result", result.id.clone(), result)
    }

    pub fn add_enum(&mut self, enum_: Enum) -> bool {
        insert_first(&mut self.enums, "enum", enum_.id.clone(), enum_)
    }

    pub fn add_enum_instance(&mut self, instance: EnumInstance) -> bool {
        insert_first(&mut self.enum_instances, "enum_instance", instance.id.clone(), instance)
    }

    /// Fold a per-file fragment into this model. Earlier entries win on id collisions.
    pub fn merge(&mut self, other: Api) {
        let mut collisions = 0usize;
        let mut count = |inserted: bool| {
            if !inserted {
                collisions += 1;
            }
        };
        for (_, m) in other.modules {
            count(self.add_module(m));
        }
        for (_, c) in other.classes {
            count(self.add_class(c));
        }
        for (_, f) in other.functions {
            count(self.add_function(f));
        }
        for (_, p) in other.parameters {
            count(self.add_parameter(p));
        }
        for (_, a) in other.attributes {
            count(self.add_attribute(a));
        }
        for (_, r) in other.results {
            count(self.add_result(r));
        }
        for (_, e) in other.enums {
            count(self.add_enum(e));
        }
        for (_, i) in other.enum_instances {
            count(self.add_enum_instance(i));
        }
        if collisions > 0 {
            warn!(collisions, "merged fragment contained ids already present in the model");
        }
    }

    /// Total number of entities across all registries.
    pub fn len(&self) -> usize {
        self.modules.len()
            + self.classes.len()
            + self.functions.len()
            + self.parameters.len()
            + self.attributes.len()
            + self.results.len()
            + self.enums.len()
            + self.enum_instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn class_by_qualified_name(&self, qualified_name: &str) -> Option<&Class> {
        self.classes
            .values()
            .find(|c| c.qualified_name == qualified_name)
    }

    /// Parameters of a function, in declaration order.
    pub fn parameters_of<'a>(
        &'a self,
        function: &'a Function,
    ) -> impl Iterator<Item = &'a Parameter> + 'a {
        function
            .parameters
            .iter()
            .filter_map(move |id| self.parameters.get(id))
    }

    /// Results of a function, in slot order.
    pub fn results_of<'a>(
        &'a self,
        function: &'a Function,
    ) -> impl Iterator<Item = &'a FunctionResult> + 'a {
        function.results.iter().filter_map(move |id| self.results.get(id))
    }

    // ------------------------------------------------------------------------
    // Method resolution
    // ------------------------------------------------------------------------

    /// C3 linearization of a class, as class ids. Bases outside the model are skipped.
    pub fn method_resolution_order(&self, class_id: &str) -> MroResult<Vec<String>> {
        let class = self.classes.get(class_id).ok_or_else(|| MroError::ClassNotFound {
            class_id: class_id.to_string(),
        })?;

        let mut by_qname: HashMap<&str, &str> = HashMap::new();
        let mut hierarchy: HashMap<String, Vec<String>> = HashMap::new();
        for c in self.classes.values() {
            by_qname.entry(c.qualified_name.as_str()).or_insert(c.id.as_str());
            hierarchy
                .entry(c.qualified_name.clone())
                .or_insert_with(|| c.superclasses.clone());
        }

        let mro = compute_mro(&class.qualified_name, &hierarchy)?;
        Ok(mro
            .iter()
            .filter_map(|qname| by_qname.get(qname.as_str()).map(|id| id.to_string()))
            .collect())
    }

    /// The nearest definition of method `name` along the MRO of `class_id`.
    pub fn resolve_method(&self, class_id: &str, name: &str) -> MroResult<Option<&Function>> {
        for id in self.method_resolution_order(class_id)? {
            let Some(class) = self.classes.get(&id) else {
                continue;
            };
            let found = class
                .methods
                .iter()
                .chain(class.constructor.iter())
                .filter_map(|fid| self.functions.get(fid))
                .find(|f| f.name == name);
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    /// A copy containing only public entities, with child id lists re-derived.
    ///
    /// Entities are kept only if every container above them is kept. The
    /// parameters and results of kept functions and the instances of kept
    /// enums are always kept.
    pub fn public_view(&self) -> Api {
        let mut view = Api::new(&self.distribution, &self.package, &self.version);

        for module in self.modules.values() {
            let mut module = module.clone();
            module.classes.retain(|id| self.copy_public_class(id, &mut view));
            module.functions.retain(|id| self.copy_public_function(id, &mut view));
            module.enums.retain(|id| self.copy_public_enum(id, &mut view));
            view.add_module(module);
        }

        view
    }

    fn copy_public_class(&self, id: &str, view: &mut Api) -> bool {
        let Some(class) = self.classes.get(id) else {
            return false;
        };
        if !class.is_public {
            return false;
        }
        let mut class = class.clone();
        class.methods.retain(|fid| self.copy_public_function(fid, view));
        class.classes.retain(|cid| self.copy_public_class(cid, view));
        class.attributes.retain(|aid| match self.attributes.get(aid) {
            Some(attr) if attr.is_public => {
                view.add_attribute(attr.clone());
                true
            }
            _ => false,
        });
        if let Some(ctor) = class.constructor.take() {
            if self.copy_public_function(&ctor, view) {
                class.constructor = Some(ctor);
            }
        }
        view.add_class(class);
        true
    }

    fn copy_public_function(&self, id: &str, view: &mut Api) -> bool {
        let Some(function) = self.functions.get(id) else {
            return false;
        };
        if !function.is_public {
            return false;
        }
        for param in self.parameters_of(function) {
            view.add_parameter(param.clone());
        }
        for result in self.results_of(function) {
            view.add_result(result.clone());
        }
        view.add_function(function.clone());
        true
    }

    fn copy_public_enum(&self, id: &str, view: &mut Api) -> bool {
        let Some(enum_) = self.enums.get(id) else {
            return false;
        };
        if !enum_.is_public {
            return false;
        }
        for instance in enum_.instances.iter().filter_map(|iid| self.enum_instances.get(iid)) {
            view.add_enum_instance(instance.clone());
        }
        view.add_enum(enum_.clone());
        true
    }

    /// Ids referenced from child lists that have no registry entry.
    pub fn dangling_references(&self) -> Vec<String> {
        let mut dangling = HashSet::new();
        let mut check = |ids: &[String], present: &dyn Fn(&String) -> bool| {
            for id in ids {
                if !present(id) {
                    dangling.insert(id.clone());
                }
            }
        };
        let class = |id: &String| self.classes.contains_key(id);
        let function = |id: &String| self.functions.contains_key(id);
        for m in self.modules.values() {
            check(&m.classes, &class);
            check(&m.functions, &function);
            check(&m.enums, &|id| self.enums.contains_key(id));
        }
        for c in self.classes.values() {
            check(&c.methods, &function);
            check(c.constructor.as_slice(), &function);
            check(&c.classes, &class);
            check(&c.attributes, &|id| self.attributes.contains_key(id));
        }
        for f in self.functions.values() {
            check(&f.parameters, &|id| self.parameters.contains_key(id));
            check(&f.results, &|id| self.results.contains_key(id));
        }
        for e in self.enums.values() {
            check(&e.instances, &|id| self.enum_instances.contains_key(id));
        }
        let mut dangling: Vec<String> = dangling.into_iter().collect();
        dangling.sort();
        dangling
    }
}

// ============================================================================
// Tests
// ============================================================================
