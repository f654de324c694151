//! Conversion of world snapshots into renderer scenes.

use tilewalk_rendering::{RenderItem, RenderingError, Scene, TileGridPresentation};
use tilewalk_world::{query, World};

/// Captures the current world state as a scene.
pub(crate) fn capture(world: &World) -> Result<Scene, RenderingError> {
    let config = query::config(world);
    let tile_grid = TileGridPresentation::new(config.columns(), config.rows(), config.tile_size())?;
    let items = query::entity_view(world)
        .into_vec()
        .into_iter()
        .map(|snapshot| RenderItem {
            entity: snapshot.id,
            sprite: snapshot.sprite,
            cell: snapshot.cell,
            position: snapshot.rendered_position,
            size: snapshot.size,
            direction: snapshot.direction,
            render_group: snapshot.render_group,
        })
        .collect();
    Ok(Scene::new(tile_grid, query::tick_index(world), items))
}

#[cfg(test)]
mod tests {
    use super::capture;
    use glam::Vec2;
    use tilewalk_core::{CellCoord, EntityId, RenderGroup};
    use tilewalk_world::{self as world, Command, EntitySpec, SimulationConfig, World};

    #[test]
    fn capture_mirrors_entity_snapshots() {
        let mut world = World::new(SimulationConfig::new(3, 2).with_tile_size(10.0));
        let mut events = Vec::new();
        for (name, cell, group) in [
            ("glow", CellCoord::new(0, 0), RenderGroup::Foreground),
            ("npc", CellCoord::new(2, 1), RenderGroup::Entity),
        ] {
            let spec = EntitySpec::new(name, cell)
                .with_sprite(format!("assets/{name}.png"))
                .with_render_group(group);
            world::apply(&mut world, Command::Spawn(spec), &mut events).expect("free cell");
        }

        let scene = capture(&world).expect("positive tile size");

        assert_eq!(scene.tick, 0);
        assert_eq!((scene.tile_grid.columns, scene.tile_grid.rows), (3, 2));
        let ids: Vec<_> = scene.items().iter().map(|item| item.entity).collect();
        assert_eq!(ids, vec![EntityId::new(1), EntityId::new(0)]);
        let npc = &scene.items()[0];
        assert_eq!(npc.sprite, "assets/npc.png");
        assert_eq!(npc.position, Vec2::new(20.0, 10.0));
        assert_eq!(npc.size, Vec2::splat(10.0));
    }

    #[test]
    fn capture_rejects_degenerate_tile_sizes() {
        let world = World::new(SimulationConfig::new(2, 2).with_tile_size(0.0));
        assert!(capture(&world).is_err());
    }
}
