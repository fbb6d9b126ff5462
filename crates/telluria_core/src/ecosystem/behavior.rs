//! Behaviour trees driving autonomous entities.

use telluria_data::LivingEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    Running,
}

/// One node of a behaviour tree. Containers store these uniformly;
/// `priority` lets goal arbiters rank competing subtrees.
pub trait Node: Send + Sync {
    fn tick(&self, entity: &mut LivingEntity) -> Status;

    fn priority(&self, _entity: &LivingEntity) -> f64 {
        0.0
    }
}

/// Runs children in order; short-circuits on the first non-success.
pub struct Sequence {
    children: Vec<Box<dyn Node>>,
}

impl Sequence {
    pub fn new(children: Vec<Box<dyn Node>>) -> Self {
        Self { children }
    }
}

impl Node for Sequence {
    fn tick(&self, entity: &mut LivingEntity) -> Status {
        for child in &self.children {
            match child.tick(entity) {
                Status::Success => continue,
                other => return other,
            }
        }
        Status::Success
    }
}

/// Runs children in order; short-circuits on the first non-failure.
pub struct Selector {
    children: Vec<Box<dyn Node>>,
}

impl Selector {
    pub fn new(children: Vec<Box<dyn Node>>) -> Self {
        Self { children }
    }
}

impl Node for Selector {
    fn tick(&self, entity: &mut LivingEntity) -> Status {
        for child in &self.children {
            match child.tick(entity) {
                Status::Failure => continue,
                other => return other,
            }
        }
        Status::Failure
    }
}

/// Predicate leaf: Success when the predicate holds.
pub struct Condition<F>
where
    F: Fn(&LivingEntity) -> bool + Send + Sync,
{
    predicate: F,
}

impl<F> Condition<F>
where
    F: Fn(&LivingEntity) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> Node for Condition<F>
where
    F: Fn(&LivingEntity) -> bool + Send + Sync,
{
    fn tick(&self, entity: &mut LivingEntity) -> Status {
        if (self.predicate)(entity) {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// Side-effect leaf with an explicit priority hook.
pub struct Action<F>
where
    F: Fn(&mut LivingEntity) -> Status + Send + Sync,
{
    name: &'static str,
    effect: F,
    priority: f64,
}

impl<F> Action<F>
where
    F: Fn(&mut LivingEntity) -> Status + Send + Sync,
{
    pub fn new(name: &'static str, priority: f64, effect: F) -> Self {
        Self {
            name,
            effect,
            priority,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> Node for Action<F>
where
    F: Fn(&mut LivingEntity) -> Status + Send + Sync,
{
    fn tick(&self, entity: &mut LivingEntity) -> Status {
        (self.effect)(entity)
    }

    fn priority(&self, _entity: &LivingEntity) -> f64 {
        self.priority
    }
}

/// The standard herbivore: eat when starving, sleep when drained,
/// otherwise wander.
pub fn herbivore_tree() -> Selector {
    let find_food = Sequence::new(vec![
        Box::new(Condition::new(|e: &LivingEntity| e.needs.hunger_critical())),
        Box::new(Action::new("find-food", 10.0, |e: &mut LivingEntity| {
            e.needs.set_hunger(e.needs.hunger() - 30.0);
            e.needs.set_energy(e.needs.energy() - 2.0);
            e.log("grazed");
            Status::Success
        })),
    ]);
    let sleep = Sequence::new(vec![
        Box::new(Condition::new(|e: &LivingEntity| e.needs.energy_critical())),
        Box::new(Action::new("sleep", 8.0, |e: &mut LivingEntity| {
            e.needs.set_energy(e.needs.energy() + 40.0);
            e.log("slept");
            Status::Success
        })),
    ]);
    let wander = Action::new("wander", 1.0, |e: &mut LivingEntity| {
        e.needs.set_energy(e.needs.energy() - 0.5);
        Status::Success
    });
    Selector::new(vec![Box::new(find_food), Box::new(sleep), Box::new(wander)])
}
