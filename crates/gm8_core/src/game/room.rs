use super::dispatch::{run_creation_code, run_event, run_phase};
use super::Game;
use crate::error::GameError;
use crate::event::{EventKind, OTHER_ROOM_END, OTHER_ROOM_START};
use crate::render::Renderer;
use crate::runner::ActionRunner;

impl<R: ActionRunner, D: Renderer> Game<R, D> {
    /// Leave the current room and enter `room_id`.
    ///
    /// Loading the room the game is already in does nothing. Otherwise:
    ///
    ///  1. room end event for every live instance
    ///  2. drop non-persistent instances
    ///  3. resize and retitle the window, set the background colour
    ///  4. update the globals (speed and size only when the speed changed)
    ///  5. create the room's instances that are not already alive, each
    ///     followed by its creation code and its create event
    ///  6. the room's creation code
    ///  7. room start event for every live instance
    pub fn load_room(&mut self, room_id: usize) -> Result<(), GameError> {
        if self.world.globals().room == Some(room_id) {
            return Ok(());
        }

        let room = self
            .assets
            .room(room_id)
            .ok_or(GameError::MissingRoom(room_id))?;
        log::info!(
            "Loading room {room_id} '{}' ({}x{} @ {})",
            room.name,
            room.width,
            room.height,
            room.speed
        );

        run_phase(
            &mut self.runner,
            &self.assets,
            &mut self.world,
            EventKind::Other(OTHER_ROOM_END),
        )?;

        self.world.instances.clear_non_persistent();

        self.renderer.resize_window(room.width, room.height);
        self.renderer.set_window_title(&room.caption);
        self.renderer.set_background_colour(room.background_colour);

        self.world.enter_room(room_id, room);

        for placed in &room.instances {
            if self
                .world
                .instances
                .get_instance_by_number(placed.id)
                .is_some()
            {
                log::debug!("Instance {} persisted, not recreating it", placed.id);
                continue;
            }

            let object = self
                .assets
                .object(placed.object_index)
                .ok_or(GameError::MissingObject(placed.object_index))?;
            let index = self.world.instances.count();
            self.world.instances.add_instance(
                placed.id,
                placed.x,
                placed.y,
                placed.object_index,
                object,
            )?;

            run_creation_code(
                &mut self.runner,
                &self.assets,
                &mut self.world,
                EventKind::InstanceCreationCode,
                &placed.creation_code,
                Some(placed.id),
            )?;

            // Creation code may have changed the object; the create event follows it.
            let object_index = self.world.instances[index].object_index;
            run_event(
                &mut self.runner,
                &self.assets,
                &mut self.world,
                placed.id,
                object_index,
                EventKind::Create,
            )?;
        }

        run_creation_code(
            &mut self.runner,
            &self.assets,
            &mut self.world,
            EventKind::RoomCreationCode,
            &room.creation_code,
            None,
        )?;

        run_phase(
            &mut self.runner,
            &self.assets,
            &mut self.world,
            EventKind::Other(OTHER_ROOM_START),
        )?;

        log::debug!(
            "Room {room_id} ready with {} instances",
            self.world.instances.count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::assets::{Action, IndexedEvent, Object};
    use crate::error::GameError;
    use crate::event::{OTHER_ROOM_END, OTHER_ROOM_START};
    use crate::testing::{
        actions, game_with, placed, placed_at, room_with, Call, RenderCall,
    };
    use crate::world::Globals;

    fn room_events_object(tag: &str) -> Object {
        Object {
            ev_create: actions(&[&format!("log:{tag}_create")]),
            ev_other: vec![
                IndexedEvent {
                    index: OTHER_ROOM_START,
                    actions: actions(&[&format!("log:{tag}_start")]),
                },
                IndexedEvent {
                    index: OTHER_ROOM_END,
                    actions: actions(&[&format!("log:{tag}_end")]),
                },
            ],
            ..Object::default()
        }
    }

    fn tags(calls: &[Call]) -> Vec<&str> {
        calls.iter().map(|call| call.tag.as_str()).collect()
    }

    #[test]
    fn loading_current_room_is_a_no_op() {
        let mut game = game_with(
            vec![room_with(vec![placed(100_001, 0)])],
            vec![room_events_object("a")],
            vec![],
        );
        game.load_room(0).expect("first load");
        game.instances_mut()
            .get_instance_by_number_mut(100_001)
            .expect("instance")
            .x = 99.0;
        let globals_before = game.globals().clone();
        let calls_before = game.runner().calls.len();
        let render_calls_before = game.renderer().calls.len();

        game.load_room(0).expect("reload same room");

        assert_eq!(game.globals(), &globals_before);
        assert_eq!(game.runner().calls.len(), calls_before);
        assert_eq!(game.renderer().calls.len(), render_calls_before);
        assert_eq!(game.instances().count(), 1);
        assert_eq!(game.instances()[0].x, 99.0);
    }

    #[test]
    fn missing_room_fails_before_anything_runs() {
        let mut game = game_with(
            vec![room_with(vec![placed(100_001, 0)])],
            vec![room_events_object("a")],
            vec![],
        );
        game.load_room(0).expect("first load");
        let calls_before = game.runner().calls.len();

        let err = game.load_room(7).expect_err("room 7 does not exist");

        assert!(matches!(err, GameError::MissingRoom(7)));
        assert_eq!(game.runner().calls.len(), calls_before, "no room end ran");
        assert_eq!(game.globals().room, Some(0));
        assert_eq!(game.instances().count(), 1);
    }

    #[test]
    fn transition_runs_steps_in_order() {
        let mut first = room_with(vec![placed(100_001, 0)]);
        first.creation_code = "log:room0_code".to_string();
        let mut second = room_with(vec![placed(100_002, 1), placed(100_003, 1)]);
        second.creation_code = "log:room1_code".to_string();
        second.instances[0].creation_code = "log:b_code".to_string();

        let mut game = game_with(
            vec![first, second],
            vec![room_events_object("a"), room_events_object("b")],
            vec![],
        );
        game.load_room(0).expect("load 0");
        game.runner_mut().calls.clear();

        game.load_room(1).expect("load 1");

        assert_eq!(
            tags(&game.runner().calls),
            vec![
                "a_end",
                "b_code",
                "b_create",
                "b_create",
                "room1_code",
                "b_start",
                "b_start",
            ]
        );
        let ids: Vec<_> = game.instances().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![100_002, 100_003]);
    }

    #[test]
    fn renderer_is_updated_after_room_end_and_before_creation() {
        let mut second = room_with(vec![]);
        second.width = 320;
        second.height = 240;
        second.caption = "Second".to_string();
        second.background_colour = 0x00_80_FF;

        let mut game = game_with(
            vec![room_with(vec![]), second],
            vec![],
            vec![],
        );
        game.load_room(0).expect("load 0");
        game.renderer_mut().calls.clear();

        game.load_room(1).expect("load 1");

        assert_eq!(
            game.renderer().calls,
            vec![
                RenderCall::Resize(320, 240),
                RenderCall::Title("Second".to_string()),
                RenderCall::Background(0x00_80_FF),
            ]
        );
    }

    #[test]
    fn persistent_instance_survives_and_is_not_recreated() {
        let keeper = Object {
            persistent: true,
            ..room_events_object("keeper")
        };
        let mut game = game_with(
            vec![
                room_with(vec![placed_at(100_001, 0, 10.0, 20.0), placed(100_002, 1)]),
                room_with(vec![placed_at(100_001, 0, 500.0, 500.0), placed(100_003, 1)]),
            ],
            vec![keeper, room_events_object("other")],
            vec![],
        );
        game.load_room(0).expect("load 0");
        {
            let kept = game
                .instances_mut()
                .get_instance_by_number_mut(100_001)
                .expect("keeper");
            kept.x = 42.0;
            kept.hspeed = 3.0;
        }
        let snapshot = game
            .instances()
            .get_instance_by_number(100_001)
            .cloned()
            .expect("keeper");
        game.runner_mut().calls.clear();

        game.load_room(1).expect("load 1");

        let kept = game
            .instances()
            .get_instance_by_number(100_001)
            .expect("keeper survives");
        assert_eq!(kept, &snapshot);
        assert!(game.instances().get_instance_by_number(100_002).is_none());
        assert!(game.instances().get_instance_by_number(100_003).is_some());

        // keeper is created once per session, but gets room start in the new room
        let calls = tags(&game.runner().calls);
        assert!(!calls.contains(&"keeper_create"));
        assert!(calls.contains(&"keeper_start"));
        let ids: Vec<_> = game.instances().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![100_001, 100_003], "persisted instances keep their place");
    }

    #[test]
    fn room_end_failure_aborts_before_clearing() {
        let failing = Object {
            ev_other: vec![IndexedEvent {
                index: OTHER_ROOM_END,
                actions: vec![Action::new("fail")],
            }],
            ..Object::default()
        };
        let mut game = game_with(
            vec![room_with(vec![placed(100_001, 0)]), room_with(vec![])],
            vec![failing],
            vec![],
        );
        game.load_room(0).expect("load 0");

        let err = game.load_room(1).expect_err("room end fails");

        assert!(matches!(err, GameError::Script { target: Some(100_001), .. }));
        assert_eq!(game.globals().room, Some(0));
        assert_eq!(game.instances().count(), 1);
    }

    #[test]
    fn instance_creation_code_failure_stops_remaining_creations() {
        let mut room = room_with(vec![placed(100_001, 0), placed(100_002, 0)]);
        room.instances[0].creation_code = "fail".to_string();
        let mut game = game_with(vec![room], vec![room_events_object("a")], vec![]);

        let err = game.load_room(0).expect_err("creation code fails");

        assert!(matches!(
            err,
            GameError::Script {
                target: Some(100_001),
                ..
            }
        ));
        assert!(game.instances().get_instance_by_number(100_002).is_none());
        assert!(!tags(&game.runner().calls).contains(&"a_create"));
    }

    #[test]
    fn room_creation_code_failure_skips_room_start() {
        let mut room = room_with(vec![placed(100_001, 0)]);
        room.creation_code = "fail".to_string();
        let mut game = game_with(vec![room], vec![room_events_object("a")], vec![]);

        let err = game.load_room(0).expect_err("room code fails");

        assert!(matches!(err, GameError::Script { target: None, .. }));
        assert!(!tags(&game.runner().calls).contains(&"a_start"));
    }

    #[test]
    fn instance_created_during_creation_is_visible_to_room_start() {
        let spawner = Object {
            ev_create: actions(&["create:1"]),
            ..Object::default()
        };
        let mut game = game_with(
            vec![room_with(vec![placed(100_001, 0)])],
            vec![spawner, room_events_object("spawned")],
            vec![],
        );

        game.load_room(0).expect("load");

        assert_eq!(game.instances().count(), 2);
        let calls = tags(&game.runner().calls);
        assert_eq!(calls, vec!["spawned_create", "spawned_start"]);
    }

    #[test]
    fn same_speed_room_keeps_cached_dimensions() {
        let mut first = room_with(vec![]);
        first.width = 640;
        first.height = 480;
        first.speed = 30;
        let mut second = room_with(vec![]);
        second.width = 2000;
        second.height = 1000;
        second.speed = 30;

        let mut game = game_with(vec![first, second], vec![], vec![]);
        game.load_room(0).expect("load 0");
        game.load_room(1).expect("load 1");

        assert_eq!(
            game.globals(),
            &Globals {
                room: Some(1),
                room_speed: 30,
                room_width: 640,
                room_height: 480,
            }
        );
        // the window still follows the room that was entered
        assert!(game
            .renderer()
            .calls
            .contains(&RenderCall::Resize(2000, 1000)));
    }

    #[test]
    fn soft_deleted_persistent_instance_is_replaced_by_room_placement() {
        let keeper = Object {
            persistent: true,
            ..Object::default()
        };
        let mut game = game_with(
            vec![
                room_with(vec![placed(100_001, 0)]),
                room_with(vec![placed_at(100_001, 0, 8.0, 8.0)]),
            ],
            vec![keeper],
            vec![],
        );
        game.load_room(0).expect("load 0");
        game.instances_mut().destroy(100_001);

        game.load_room(1).expect("load 1");

        let live = game
            .instances()
            .get_instance_by_number(100_001)
            .expect("recreated");
        assert_eq!((live.x, live.y), (8.0, 8.0));
    }

    #[test]
    fn created_instance_does_not_take_a_later_placement_id() {
        let spawner = Object {
            ev_create: actions(&["create:1"]),
            ..Object::default()
        };
        let mut game = game_with(
            vec![room_with(vec![
                placed(100_001, 0),
                placed_at(100_002, 1, 40.0, 50.0),
            ])],
            vec![spawner, Object::default()],
            vec![],
        );

        game.load_room(0).expect("load");

        assert_eq!(game.instances().count(), 3);
        let ids: Vec<_> = game.instances().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![100_001, 100_003, 100_002]);
        let placement = game
            .instances()
            .get_instance_by_number(100_002)
            .expect("placement created");
        assert_eq!((placement.x, placement.y), (40.0, 50.0));
    }
}
