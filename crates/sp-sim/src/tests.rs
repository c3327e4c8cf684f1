//! Unit tests for the scripted simulator and the trait defaults.

#[cfg(test)]
mod scripted_tests {
    use sp_core::{LaneId, Tick, TrafficLightId, VehicleCategory, VehicleId};

    use crate::scripted::ScriptCommand;
    use crate::{ScriptedSimulator, ScriptedSimulatorBuilder, ScriptedVehicle, SimulatorError, TrafficSimulator};

    fn j1() -> TrafficLightId {
        TrafficLightId::from("J1")
    }

    /// Four-phase junction: north green 2 s, amber 1 s, east green 2 s, amber 1 s.
    fn junction() -> ScriptedSimulatorBuilder {
        ScriptedSimulatorBuilder::new()
            .traffic_light("J1", [("GGrr", 2.0), ("yyrr", 1.0), ("rrGG", 2.0), ("rryy", 1.0)])
            .controlled_lanes("J1", ["n_0", "n_1", "e_0", "e_1"])
    }

    fn steps(sim: &mut ScriptedSimulator, n: usize) {
        for _ in 0..n {
            sim.step().unwrap();
        }
    }

    #[test]
    fn phases_cycle_on_their_durations() {
        let mut sim = junction().build().unwrap();
        assert_eq!(sim.phase(&j1()).unwrap(), 0);
        steps(&mut sim, 2);
        assert_eq!(sim.phase(&j1()).unwrap(), 1);
        steps(&mut sim, 1);
        assert_eq!(sim.phase(&j1()).unwrap(), 2);
        steps(&mut sim, 3);
        assert_eq!(sim.phase(&j1()).unwrap(), 0);
        assert_eq!(sim.current_tick(), Tick(6));
    }

    #[test]
    fn vehicle_on_green_lane_clears() {
        let mut sim = junction()
            .vehicle(ScriptedVehicle::new("car0", VehicleCategory::Passenger, "n_0").clears_after(2))
            .build()
            .unwrap();
        assert!(sim.has_pending_work().unwrap());
        steps(&mut sim, 1);
        assert_eq!(sim.vehicle_ids().unwrap().len(), 1);
        steps(&mut sim, 1);
        assert!(sim.vehicle_ids().unwrap().is_empty());
        assert!(sim.has_exited(&VehicleId::from("car0")));
        assert!(!sim.has_pending_work().unwrap());
    }

    #[test]
    fn vehicle_on_red_lane_waits_for_green() {
        let mut sim = junction()
            .vehicle(ScriptedVehicle::new("car0", VehicleCategory::Passenger, "e_0"))
            .build()
            .unwrap();
        // East turns green after tick 3; the vehicle moves during step 4.
        steps(&mut sim, 3);
        assert!(!sim.has_exited(&VehicleId::from("car0")));
        steps(&mut sim, 1);
        assert!(sim.has_exited(&VehicleId::from("car0")));
    }

    #[test]
    fn uncontrolled_lane_flows_freely() {
        let mut sim = junction()
            .vehicle(ScriptedVehicle::new("car0", VehicleCategory::Passenger, "upstream").clears_after(3))
            .build()
            .unwrap();
        steps(&mut sim, 3);
        assert!(sim.has_exited(&VehicleId::from("car0")));
    }

    #[test]
    fn stuck_vehicle_never_leaves() {
        let mut sim = junction()
            .vehicle(ScriptedVehicle::new("ev0", VehicleCategory::Emergency, "n_0").stuck())
            .build()
            .unwrap();
        steps(&mut sim, 50);
        assert!(sim.emergency_vehicle_present().unwrap());
        assert!(sim.has_pending_work().unwrap());
    }

    #[test]
    fn late_entry_is_pending_but_not_listed() {
        let mut sim = junction()
            .vehicle(ScriptedVehicle::new("car0", VehicleCategory::Bus, "n_0").enters_at(Tick(5)))
            .build()
            .unwrap();
        assert!(sim.vehicle_ids().unwrap().is_empty());
        assert!(sim.has_pending_work().unwrap());
        steps(&mut sim, 5);
        assert_eq!(sim.vehicle_ids().unwrap(), vec![VehicleId::from("car0")]);
        assert_eq!(sim.vehicle_category(&VehicleId::from("car0")).unwrap(), VehicleCategory::Bus);
    }

    #[test]
    fn lane_count_includes_base_queue() {
        let mut sim = junction()
            .lane("e_0", 12)
            .vehicle(ScriptedVehicle::new("car0", VehicleCategory::Passenger, "e_0"))
            .build()
            .unwrap();
        assert_eq!(sim.lane_vehicle_count(&LaneId::from("e_0")).unwrap(), 13);
        assert_eq!(sim.lane_vehicle_count(&LaneId::from("n_1")).unwrap(), 0);
        assert!(matches!(
            sim.lane_vehicle_count(&LaneId::from("nowhere")),
            Err(SimulatorError::LaneNotFound(_))
        ));
    }

    #[test]
    fn link_index_lookup() {
        let mut sim = junction().build().unwrap();
        assert_eq!(sim.lane_link_index(&j1(), &LaneId::from("e_0")).unwrap(), Some(2));
        assert_eq!(sim.lane_link_index(&j1(), &LaneId::from("upstream")).unwrap(), None);
        assert!(matches!(
            sim.lane_link_index(&TrafficLightId::from("J9"), &LaneId::from("e_0")),
            Err(SimulatorError::TrafficLightNotFound(_))
        ));
    }

    #[test]
    fn vanishing_vehicle_is_listed_but_unresolvable() {
        let mut sim = junction()
            .vehicle(ScriptedVehicle::new("ghost", VehicleCategory::Emergency, "e_0"))
            .vanishing_vehicle("ghost")
            .build()
            .unwrap();
        let ghost = VehicleId::from("ghost");
        assert_eq!(sim.vehicle_ids().unwrap(), vec![ghost.clone()]);
        assert!(matches!(sim.vehicle_lane(&ghost), Err(SimulatorError::VehicleNotFound(_))));
        // The default clearance check skips it rather than failing.
        assert!(!sim.emergency_vehicle_present().unwrap());
    }

    #[test]
    fn set_phase_is_recorded_and_bounded() {
        let mut sim = junction().build().unwrap();
        sim.step().unwrap();
        sim.set_phase(&j1(), 2).unwrap();
        sim.set_phase_duration(&j1(), 40.0).unwrap();
        assert_eq!(sim.signal_state(&j1()).unwrap().to_string(), "rrGG");
        assert_eq!(
            sim.commands(),
            &[
                ScriptCommand::SetPhase { tick: Tick(1), light: j1(), phase: 2 },
                ScriptCommand::SetPhaseDuration { tick: Tick(1), light: j1(), secs: 40.0 },
            ]
        );

        let err = sim.set_phase(&j1(), 4).unwrap_err();
        assert!(matches!(err, SimulatorError::PhaseOutOfRange { phase: 4, count: 4, .. }));
    }

    #[test]
    fn refused_phase_is_rejected_but_cycled_into() {
        let mut sim = junction().reject_phase("J1", 2).build().unwrap();
        let err = sim.set_phase(&j1(), 2).unwrap_err();
        assert!(matches!(err, SimulatorError::Rejected(_)), "got {err:?}");
        assert!(!err.is_fatal());
        assert!(sim.commands().is_empty());
        assert_eq!(sim.actual_phase(&j1()), Some(0));

        sim.set_phase(&j1(), 1).unwrap();
        steps(&mut sim, 1);
        assert_eq!(sim.actual_phase(&j1()), Some(2));
    }

    #[test]
    fn phase_duration_extends_current_phase() {
        let mut sim = junction().build().unwrap();
        sim.set_phase_duration(&j1(), 10.0).unwrap();
        steps(&mut sim, 9);
        assert_eq!(sim.phase(&j1()).unwrap(), 0);
        steps(&mut sim, 1);
        assert_eq!(sim.phase(&j1()).unwrap(), 1);
    }

    #[test]
    fn misreported_phase() {
        let mut sim = junction().misreport_phase("J1", 99).build().unwrap();
        assert_eq!(sim.phase(&j1()).unwrap(), 99);
        assert_eq!(sim.actual_phase(&j1()), Some(0));
    }

    #[test]
    fn initial_phase_respected() {
        let mut sim = junction().initial_phase("J1", 2).build().unwrap();
        assert_eq!(sim.phase(&j1()).unwrap(), 2);
        assert!(junction().initial_phase("J1", 7).build().is_err());
    }

    #[test]
    fn closed_session_refuses_work() {
        let mut sim = junction().build().unwrap();
        sim.close().unwrap();
        sim.close().unwrap();
        assert!(sim.is_closed());
        assert!(matches!(sim.step(), Err(SimulatorError::Closed)));
        assert!(matches!(sim.vehicle_ids(), Err(SimulatorError::Closed)));
    }

    #[test]
    fn bad_programs_rejected() {
        let bad_char = ScriptedSimulatorBuilder::new().traffic_light("J1", [("GxG", 5.0)]).build();
        assert!(matches!(bad_char, Err(SimulatorError::Rejected(_))));

        let no_phases = ScriptedSimulatorBuilder::new()
            .traffic_light("J1", std::iter::empty::<(&str, f64)>())
            .build();
        assert!(no_phases.is_err());

        let zero_dur = ScriptedSimulatorBuilder::new().traffic_light("J1", [("GG", 0.0)]).build();
        assert!(zero_dur.is_err());
    }

    #[test]
    fn fatal_classification() {
        assert!(SimulatorError::Closed.is_fatal());
        assert!(SimulatorError::Connection("refused".into()).is_fatal());
        assert!(!SimulatorError::VehicleNotFound(VehicleId::from("x")).is_fatal());
    }
}
