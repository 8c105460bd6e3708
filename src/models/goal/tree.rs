//! Arena storage for the goal hierarchy.
//!
//! Goals are stored by id with a parent index and ordered child lists, so
//! sub-goal edits touch a single node. Reparenting refuses moves that would
//! place a goal beneath itself.

use std::collections::HashMap;

use super::Goal;
use crate::models::template::TemplateError;

#[derive(Debug, Clone)]
struct GoalNode {
    goal: Goal,
    children: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GoalTree {
    nodes: HashMap<String, GoalNode>,
    roots: Vec<String>,
}

impl GoalTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a flat list. Children may appear before their
    /// parents; a goal whose parent never appears is an error.
    pub fn from_goals(goals: impl IntoIterator<Item = Goal>) -> Result<Self, TemplateError> {
        let mut tree = Self::new();
        let mut pending: Vec<Goal> = goals.into_iter().collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for goal in pending {
                match &goal.parent_id {
                    Some(parent) if !tree.contains(parent) => deferred.push(goal),
                    _ => tree.insert(goal)?,
                }
            }
            if deferred.len() == before {
                let orphan = &deferred[0];
                return Err(TemplateError::UnknownParent(
                    orphan.parent_id.clone().unwrap_or_default(),
                ));
            }
            pending = deferred;
        }

        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Goal> {
        self.nodes.get(id).map(|node| &node.goal)
    }

    pub fn insert(&mut self, goal: Goal) -> Result<(), TemplateError> {
        goal.validate()?;
        if self.contains(&goal.id) {
            return Err(TemplateError::DuplicateGoal(goal.id));
        }

        match &goal.parent_id {
            Some(parent) => {
                let parent_node = self
                    .nodes
                    .get_mut(parent)
                    .ok_or_else(|| TemplateError::UnknownParent(parent.clone()))?;
                parent_node.children.push(goal.id.clone());
            }
            None => self.roots.push(goal.id.clone()),
        }

        self.nodes.insert(
            goal.id.clone(),
            GoalNode {
                goal,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Replace a goal's fields. A changed `parent_id` moves the goal.
    pub fn update(&mut self, goal: Goal) -> Result<(), TemplateError> {
        goal.validate()?;
        let current_parent = self
            .get(&goal.id)
            .ok_or_else(|| TemplateError::UnknownGoal(goal.id.clone()))?
            .parent_id
            .clone();

        if current_parent != goal.parent_id {
            self.reparent(&goal.id, goal.parent_id.as_deref())?;
        }

        if let Some(node) = self.nodes.get_mut(&goal.id) {
            node.goal = goal;
        }
        Ok(())
    }

    pub fn reparent(&mut self, id: &str, new_parent: Option<&str>) -> Result<(), TemplateError> {
        if !self.contains(id) {
            return Err(TemplateError::UnknownGoal(id.to_string()));
        }

        if let Some(parent) = new_parent {
            if !self.contains(parent) {
                return Err(TemplateError::UnknownParent(parent.to_string()));
            }
            if parent == id || self.descendant_ids(id).iter().any(|d| d == parent) {
                return Err(TemplateError::Cycle {
                    goal: id.to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        self.detach(id);
        match new_parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.children.push(id.to_string());
                }
            }
            None => self.roots.push(id.to_string()),
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.goal.parent_id = new_parent.map(str::to_string);
        }
        Ok(())
    }

    /// Remove a goal and its whole subtree, returning the removed goals
    /// (the requested goal first).
    pub fn remove(&mut self, id: &str) -> Result<Vec<Goal>, TemplateError> {
        if !self.contains(id) {
            return Err(TemplateError::UnknownGoal(id.to_string()));
        }

        self.detach(id);
        let mut doomed = vec![id.to_string()];
        doomed.extend(self.descendant_ids(id));

        Ok(doomed
            .into_iter()
            .filter_map(|goal_id| self.nodes.remove(&goal_id).map(|node| node.goal))
            .collect())
    }

    pub fn roots(&self) -> Vec<&Goal> {
        self.roots.iter().filter_map(|id| self.get(id)).collect()
    }

    pub fn children(&self, id: &str) -> Vec<&Goal> {
        self.nodes
            .get(id)
            .map(|node| node.children.iter().filter_map(|c| self.get(c)).collect())
            .unwrap_or_default()
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: &str) -> Vec<&Goal> {
        let mut result = Vec::new();
        let mut current = self.get(id).and_then(|goal| goal.parent_id.as_deref());
        while let Some(parent_id) = current {
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            result.push(parent);
            current = parent.parent_id.as_deref();
        }
        result
    }

    /// Descendant ids in pre-order.
    pub fn descendant_ids(&self, id: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut stack: Vec<&String> = match self.nodes.get(id) {
            Some(node) => node.children.iter().rev().collect(),
            None => return result,
        };
        while let Some(next) = stack.pop() {
            result.push(next.clone());
            if let Some(node) = self.nodes.get(next) {
                stack.extend(node.children.iter().rev());
            }
        }
        result
    }

    /// All goals in pre-order from the roots.
    pub fn iter(&self) -> impl Iterator<Item = &Goal> + '_ {
        self.roots.iter().flat_map(move |root| {
            std::iter::once(root.clone())
                .chain(self.descendant_ids(root))
                .filter_map(move |id| self.get(&id))
        })
    }

    /// Goals that act as recurring templates.
    pub fn habit_goals(&self) -> Vec<&Goal> {
        self.iter().filter(|goal| goal.is_habit).collect()
    }

    fn detach(&mut self, id: &str) {
        let parent = self.get(id).and_then(|goal| goal.parent_id.clone());
        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.retain(|child| child != id);
                }
            }
            None => self.roots.retain(|root| root != id),
        }
    }
}
