//! Per-agent state owned by the world.

use glam::Vec2;
use tilewalk_core::{CellCoord, CollisionKind, Direction, EntityId, EntityKind, RenderGroup};

use crate::{action::Action, behavior::Behavior, grid::Occupant};

/// Rendered coordinate of a cell's origin for the provided tile size.
#[must_use]
pub fn cell_origin(cell: CellCoord, tile_size: f32) -> Vec2 {
    Vec2::new(cell.column() as f32, cell.row() as f32) * tile_size
}

/// Description of an entity that should be placed into the world.
#[derive(Clone, Debug)]
pub struct EntitySpec {
    name: String,
    sprite: String,
    cell: CellCoord,
    direction: Direction,
    collision: CollisionKind,
    kind: EntityKind,
    render_group: RenderGroup,
    behavior: Option<Behavior>,
}

impl EntitySpec {
    /// Creates a solid, down-facing NPC spec whose sprite matches its name.
    #[must_use]
    pub fn new(name: impl Into<String>, cell: CellCoord) -> Self {
        let name = name.into();
        Self {
            sprite: name.clone(),
            name,
            cell,
            direction: Direction::Down,
            collision: CollisionKind::Solid,
            kind: EntityKind::Npc,
            render_group: RenderGroup::Entity,
            behavior: None,
        }
    }

    /// Replaces the sprite identifier handed to renderers.
    #[must_use]
    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = sprite.into();
        self
    }

    /// Replaces the initial facing direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Replaces the collision kind.
    #[must_use]
    pub fn with_collision(mut self, collision: CollisionKind) -> Self {
        self.collision = collision;
        self
    }

    /// Replaces the entity classification.
    #[must_use]
    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    /// Replaces the render layer.
    #[must_use]
    pub fn with_render_group(mut self, render_group: RenderGroup) -> Self {
        self.render_group = render_group;
        self
    }

    /// Installs the behavior that drives the entity.
    #[must_use]
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Spawn cell of the entity.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Display name of the entity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Mutable state of a single agent.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
    sprite: String,
    kind: EntityKind,
    render_group: RenderGroup,
    collision: CollisionKind,
    size: Vec2,
    cell: CellCoord,
    rendered_position: Vec2,
    direction: Direction,
    pub(crate) action: Option<Action>,
    pub(crate) behavior: Option<Behavior>,
}

impl Entity {
    pub(crate) fn from_spec(id: EntityId, spec: EntitySpec, tile_size: f32) -> Self {
        Self {
            id,
            name: spec.name,
            sprite: spec.sprite,
            kind: spec.kind,
            render_group: spec.render_group,
            collision: spec.collision,
            size: Vec2::splat(tile_size),
            cell: spec.cell,
            rendered_position: cell_origin(spec.cell, tile_size),
            direction: spec.direction,
            action: None,
            behavior: spec.behavior,
        }
    }

    /// Stable identifier of the entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Display name of the entity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sprite identifier handed to renderers.
    #[must_use]
    pub fn sprite(&self) -> &str {
        &self.sprite
    }

    /// Classification of the entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Layer the entity is drawn on.
    #[must_use]
    pub const fn render_group(&self) -> RenderGroup {
        self.render_group
    }

    /// Collision kind of the entity.
    #[must_use]
    pub const fn collision(&self) -> CollisionKind {
        self.collision
    }

    /// Bounding box size in rendered units.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Authoritative grid cell.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Continuous position used for animation.
    #[must_use]
    pub const fn rendered_position(&self) -> Vec2 {
        self.rendered_position
    }

    /// Current facing direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Action currently in progress, if any.
    #[must_use]
    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    /// Behavior driving the entity, if any.
    #[must_use]
    pub fn behavior(&self) -> Option<&Behavior> {
        self.behavior.as_ref()
    }

    /// Back-reference stored in tiles the entity holds.
    #[must_use]
    pub const fn occupant(&self) -> Occupant {
        Occupant::new(self.id, self.collision)
    }

    pub(crate) fn set_cell(&mut self, cell: CellCoord) {
        self.cell = cell;
    }

    pub(crate) fn set_rendered_position(&mut self, position: Vec2) {
        self.rendered_position = position;
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }
}
