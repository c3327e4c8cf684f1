//! Unit tests for sp-traci.  The client runs against in-memory streams
//! pre-loaded with server replies.

#[cfg(test)]
mod fixtures {
    use std::io::{self, Cursor, Read, Write};

    use crate::codec::{Writer, encode_command, encode_message};
    use crate::constants::*;
    use crate::{TraciSimulator, TraciValue};

    /// Replays canned bytes and records everything written.
    pub struct MockStream {
        pub input:  Cursor<Vec<u8>>,
        pub output: Vec<u8>,
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub fn mock(replies: &[Vec<u8>]) -> MockStream {
        MockStream { input: Cursor::new(replies.concat()), output: Vec::new() }
    }

    pub fn status(id: u8, result: u8, description: &str) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(result).string(description);
        encode_command(id, w.as_bytes())
    }

    pub fn status_reply(id: u8) -> Vec<u8> {
        encode_message(&status(id, RTYPE_OK, ""))
    }

    pub fn error_reply(id: u8, description: &str) -> Vec<u8> {
        encode_message(&status(id, RTYPE_ERR, description))
    }

    pub fn get_reply(domain: u8, var: u8, object: &str, value: TraciValue) -> Vec<u8> {
        let mut body = status(domain, RTYPE_OK, "");
        let mut w = Writer::new();
        w.u8(var).string(object).value(&value);
        body.extend(encode_command(domain + RESPONSE_OFFSET, w.as_bytes()));
        encode_message(&body)
    }

    pub fn step_reply() -> Vec<u8> {
        let mut body = status(CMD_SIMSTEP, RTYPE_OK, "");
        body.extend(0i32.to_be_bytes());
        encode_message(&body)
    }

    pub fn version_reply() -> Vec<u8> {
        let mut body = status(CMD_GETVERSION, RTYPE_OK, "");
        let mut w = Writer::new();
        w.i32(21).string("SUMO 1.20.0");
        body.extend(encode_command(CMD_GETVERSION, w.as_bytes()));
        encode_message(&body)
    }

    pub fn handshake(step: TraciValue) -> Vec<Vec<u8>> {
        vec![version_reply(), get_reply(CMD_GET_SIM_VARIABLE, VAR_DELTA_T, "", step)]
    }

    /// A simulator past its handshake (1 s steps) with `replies` queued.
    pub fn connected(replies: Vec<Vec<u8>>) -> TraciSimulator<MockStream> {
        let mut all = handshake(TraciValue::Double(1.0));
        all.extend(replies);
        TraciSimulator::connect(mock(&all)).unwrap()
    }

    pub fn strs(items: &[&str]) -> TraciValue {
        TraciValue::StringList(items.iter().map(|s| s.to_string()).collect())
    }

    /// One program logic with `n` phases.
    pub fn logic(program: &str, n: usize) -> TraciValue {
        let phase = TraciValue::Compound(vec![
            TraciValue::Double(30.0),
            TraciValue::String("GGrr".into()),
            TraciValue::Double(30.0),
            TraciValue::Double(30.0),
            TraciValue::Compound(vec![]),
            TraciValue::String(String::new()),
        ]);
        TraciValue::Compound(vec![
            TraciValue::String(program.into()),
            TraciValue::Int(0),
            TraciValue::Int(0),
            TraciValue::Compound(vec![phase; n]),
            TraciValue::Compound(vec![]),
        ])
    }
}

#[cfg(test)]
mod codec_tests {
    use crate::codec::{Reader, Writer, encode_command, encode_message};
    use crate::constants::*;
    use crate::{TraciError, TraciValue};

    use super::fixtures::status;

    #[test]
    fn short_command_framing() {
        let framed = encode_command(CMD_SIMSTEP, &[0u8; 8]);
        assert_eq!(framed[0], 10);
        assert_eq!(framed[1], CMD_SIMSTEP);
        assert_eq!(framed.len(), 10);
    }

    #[test]
    fn extended_command_framing() {
        let content = vec![7u8; 300];
        let framed = encode_command(CMD_SET_TL_VARIABLE, &content);
        assert_eq!(framed[0], 0);
        assert_eq!(i32::from_be_bytes([framed[1], framed[2], framed[3], framed[4]]), 306);
        assert_eq!(framed[5], CMD_SET_TL_VARIABLE);

        let mut r = Reader::new(&framed);
        let cmd = r.command().unwrap();
        assert_eq!(cmd.id, CMD_SET_TL_VARIABLE);
        assert_eq!(cmd.content.len(), 300);
        assert!(r.is_empty());
    }

    #[test]
    fn message_length_includes_header() {
        let msg = encode_message(&[1, 2, 3]);
        assert_eq!(&msg[..4], &7i32.to_be_bytes());
    }

    #[test]
    fn big_endian_scalars() {
        let mut w = Writer::new();
        w.i32(0x0102_0304).string("ab");
        assert_eq!(w.as_bytes(), &[1, 2, 3, 4, 0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    fn nested_compound_decodes() {
        let value = TraciValue::Compound(vec![
            TraciValue::Int(-3),
            TraciValue::String("J1".into()),
            TraciValue::StringList(vec!["n_0".into(), "e_0".into()]),
            TraciValue::Compound(vec![TraciValue::Double(2.5), TraciValue::UByte(9)]),
        ]);
        let mut w = Writer::new();
        w.value(&value);
        let mut r = Reader::new(w.as_bytes());
        assert_eq!(r.value().unwrap(), value);
        assert!(r.is_empty());
    }

    #[test]
    fn truncated_string_is_malformed() {
        let mut w = Writer::new();
        w.i32(10).bytes(b"abc");
        let err = Reader::new(w.as_bytes()).string().unwrap_err();
        assert!(matches!(err, TraciError::Malformed(_)));
    }

    #[test]
    fn negative_length_is_malformed() {
        let mut w = Writer::new();
        w.i32(-1);
        assert!(matches!(Reader::new(w.as_bytes()).string_list(), Err(TraciError::Malformed(_))));
    }

    #[test]
    fn unknown_type_is_malformed() {
        let err = Reader::new(&[0x55, 0, 0]).value().unwrap_err();
        assert!(err.to_string().contains("0x55"));
    }

    #[test]
    fn failed_status_carries_description() {
        let bytes = status(CMD_GET_VEHICLE_VARIABLE, RTYPE_ERR, "Vehicle 'x' is not known");
        let cmd = Reader::new(&bytes).command().unwrap();
        match cmd.into_status(CMD_GET_VEHICLE_VARIABLE) {
            Err(TraciError::CommandFailed { command, description }) => {
                assert_eq!(command, CMD_GET_VEHICLE_VARIABLE);
                assert_eq!(description, "Vehicle 'x' is not known");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn status_for_other_command_rejected() {
        let bytes = status(CMD_SIMSTEP, RTYPE_OK, "");
        let cmd = Reader::new(&bytes).command().unwrap();
        assert!(matches!(
            cmd.into_status(CMD_CLOSE),
            Err(TraciError::UnexpectedCommand { expected: CMD_CLOSE, got: CMD_SIMSTEP })
        ));
    }

    #[test]
    fn typed_accessors() {
        assert_eq!(TraciValue::Int(4).into_f64().unwrap(), 4.0);
        assert!(TraciValue::Double(1.0).into_int().is_err());
        assert!(TraciValue::String("x".into()).into_compound().is_err());
    }
}

#[cfg(test)]
mod client_tests {
    use crate::codec::{Writer, encode_command, encode_message};
    use crate::constants::*;
    use crate::{TraciClient, TraciError, TraciValue};

    use super::fixtures::*;

    #[test]
    fn get_writes_request_and_decodes_value() {
        let stream = mock(&[get_reply(
            CMD_GET_VEHICLE_VARIABLE,
            VAR_LANE_ID,
            "ev0",
            TraciValue::String("e_0".into()),
        )]);
        let mut client = TraciClient::new(stream);
        let value = client.get(CMD_GET_VEHICLE_VARIABLE, VAR_LANE_ID, "ev0").unwrap();
        assert_eq!(value, TraciValue::String("e_0".into()));

        let mut w = Writer::new();
        w.u8(VAR_LANE_ID).string("ev0");
        let expected = encode_message(&encode_command(CMD_GET_VEHICLE_VARIABLE, w.as_bytes()));
        assert_eq!(client.get_ref().output, expected);
    }

    #[test]
    fn error_status_becomes_command_failed() {
        let mut client = TraciClient::new(mock(&[error_reply(CMD_GET_LANE_VARIABLE, "no such lane")]));
        let err = client.get(CMD_GET_LANE_VARIABLE, LAST_STEP_VEHICLE_NUMBER, "x").unwrap_err();
        assert!(matches!(err, TraciError::CommandFailed { .. }));
    }

    #[test]
    fn reply_for_other_object_rejected() {
        let stream = mock(&[get_reply(CMD_GET_TL_VARIABLE, TL_CURRENT_PHASE, "J2", TraciValue::Int(1))]);
        let mut client = TraciClient::new(stream);
        assert!(matches!(
            client.get(CMD_GET_TL_VARIABLE, TL_CURRENT_PHASE, "J1"),
            Err(TraciError::Malformed(_))
        ));
    }

    #[test]
    fn simulation_step_consumes_subscription_count() {
        let mut client = TraciClient::new(mock(&[step_reply(), step_reply()]));
        client.simulation_step().unwrap();
        client.simulation_step().unwrap();
    }

    #[test]
    fn set_encodes_typed_value() {
        let mut client = TraciClient::new(mock(&[status_reply(CMD_SET_TL_VARIABLE)]));
        client
            .set(CMD_SET_TL_VARIABLE, TL_PHASE_INDEX, "J1", &TraciValue::Int(3))
            .unwrap();

        let mut w = Writer::new();
        w.u8(TL_PHASE_INDEX).string("J1").u8(TYPE_INTEGER).i32(3);
        let expected = encode_message(&encode_command(CMD_SET_TL_VARIABLE, w.as_bytes()));
        assert_eq!(client.get_ref().output, expected);
    }

    #[test]
    fn version_handshake() {
        let mut client = TraciClient::new(mock(&[version_reply()]));
        let (api, id) = client.version().unwrap();
        assert_eq!(api, 21);
        assert_eq!(id, "SUMO 1.20.0");
    }

    #[test]
    fn eof_is_io_error() {
        let mut client = TraciClient::new(mock(&[]));
        assert!(matches!(client.close(), Err(TraciError::Io(_))));
    }
}

#[cfg(test)]
mod simulator_tests {
    use sp_core::{LaneId, Tick, TrafficLightId, VehicleCategory, VehicleId};
    use sp_sim::{SimulatorError, TrafficSimulator};

    use crate::constants::*;
    use crate::simulator::phases_in_program;
    use crate::{TraciError, TraciSimulator, TraciValue};

    use super::fixtures::*;

    fn j1() -> TrafficLightId {
        TrafficLightId::from("J1")
    }

    #[test]
    fn step_length_from_double_or_millis() {
        let sim = connected(vec![]);
        assert_eq!(sim.step_length_secs(), 1.0);

        let sim = TraciSimulator::connect(mock(&handshake(TraciValue::Int(500)))).unwrap();
        assert_eq!(sim.step_length_secs(), 0.5);
    }

    #[test]
    fn step_advances_tick() {
        let mut sim = connected(vec![step_reply(), step_reply()]);
        assert_eq!(sim.step().unwrap(), Tick(1));
        assert_eq!(sim.step().unwrap(), Tick(2));
        assert_eq!(sim.current_tick(), Tick(2));
    }

    #[test]
    fn pending_work_from_expected_vehicles() {
        let mut sim = connected(vec![
            get_reply(CMD_GET_SIM_VARIABLE, VAR_MIN_EXPECTED_VEHICLES, "", TraciValue::Int(4)),
            get_reply(CMD_GET_SIM_VARIABLE, VAR_MIN_EXPECTED_VEHICLES, "", TraciValue::Int(0)),
        ]);
        assert!(sim.has_pending_work().unwrap());
        assert!(!sim.has_pending_work().unwrap());
    }

    #[test]
    fn vehicle_class_maps_to_category() {
        let mut sim = connected(vec![get_reply(
            CMD_GET_VEHICLE_VARIABLE,
            VAR_VEHICLECLASS,
            "amb1",
            TraciValue::String("emergency".into()),
        )]);
        assert_eq!(
            sim.vehicle_category(&VehicleId::from("amb1")).unwrap(),
            VehicleCategory::Emergency
        );
    }

    #[test]
    fn unknown_vehicle_is_not_fatal() {
        let mut sim = connected(vec![error_reply(CMD_GET_VEHICLE_VARIABLE, "Vehicle 'gone' is not known")]);
        let err = sim.vehicle_lane(&VehicleId::from("gone")).unwrap_err();
        assert!(matches!(err, SimulatorError::VehicleNotFound(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn link_index_is_cached() {
        // Only one reply queued: a second fetch would hit EOF.
        let mut sim = connected(vec![get_reply(
            CMD_GET_TL_VARIABLE,
            TL_CONTROLLED_LANES,
            "J1",
            strs(&["n_0", "n_0", "e_0", "e_1"]),
        )]);
        assert_eq!(sim.lane_link_index(&j1(), &LaneId::from("n_0")).unwrap(), Some(0));
        assert_eq!(sim.lane_link_index(&j1(), &LaneId::from("e_0")).unwrap(), Some(2));
        assert_eq!(sim.lane_link_index(&j1(), &LaneId::from("w_0")).unwrap(), None);
    }

    #[test]
    fn signal_state_parsed() {
        let mut sim = connected(vec![
            get_reply(CMD_GET_TL_VARIABLE, TL_RED_YELLOW_GREEN_STATE, "J1", TraciValue::String("rrGG".into())),
            get_reply(CMD_GET_TL_VARIABLE, TL_RED_YELLOW_GREEN_STATE, "J1", TraciValue::String("r?".into())),
        ]);
        let state = sim.signal_state(&j1()).unwrap();
        assert!(state.is_red(0));
        assert!(state.is_green(3));
        assert!(matches!(sim.signal_state(&j1()), Err(SimulatorError::Protocol(_))));
    }

    #[test]
    fn phase_count_uses_current_program() {
        let definition = TraciValue::Compound(vec![logic("0", 4), logic("night", 3)]);
        let mut sim = connected(vec![
            get_reply(CMD_GET_TL_VARIABLE, TL_CURRENT_PROGRAM, "J1", TraciValue::String("night".into())),
            get_reply(CMD_GET_TL_VARIABLE, TL_COMPLETE_DEFINITION_RYG, "J1", definition),
        ]);
        assert_eq!(sim.phase_count(&j1()).unwrap(), 3);
    }

    #[test]
    fn phase_count_falls_back_to_first_logic() {
        let definition = TraciValue::Compound(vec![logic("0", 4), logic("night", 3)]);
        assert_eq!(phases_in_program(definition, "missing").unwrap(), 4);
        assert!(phases_in_program(TraciValue::Compound(vec![]), "0").is_err());
    }

    #[test]
    fn negative_phase_reports_out_of_range() {
        let mut sim = connected(vec![get_reply(
            CMD_GET_TL_VARIABLE,
            TL_CURRENT_PHASE,
            "J1",
            TraciValue::Int(-1),
        )]);
        assert_eq!(sim.phase(&j1()).unwrap(), usize::MAX);
    }

    #[test]
    fn close_is_idempotent() {
        let mut sim = connected(vec![status_reply(CMD_CLOSE)]);
        sim.close().unwrap();
        sim.close().unwrap();
        assert!(matches!(sim.step(), Err(SimulatorError::Closed)));
        assert!(matches!(sim.vehicle_ids(), Err(SimulatorError::Closed)));
    }

    #[test]
    fn error_mapping() {
        let closed: SimulatorError = TraciError::Closed.into();
        assert!(matches!(closed, SimulatorError::Closed));
        let proto: SimulatorError = TraciError::Malformed("x".into()).into();
        assert!(proto.is_fatal());
        let rejected: SimulatorError =
            TraciError::CommandFailed { command: 0xc2, description: "bad".into() }.into();
        assert!(!rejected.is_fatal());
    }
}

#[cfg(test)]
mod launcher_tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::path::Path;
    use std::thread;

    use sp_core::{Rendering, SimulationConfig};
    use sp_sim::TrafficSimulator;

    use crate::constants::*;
    use crate::{SumoLauncher, TraciError, TraciValue};

    use super::fixtures::{get_reply, status_reply, version_reply};

    fn config(port: u16) -> SimulationConfig {
        SimulationConfig {
            rendering: Rendering::Gui,
            config_path: "scenario.sumocfg".into(),
            port,
            connect_retries: 3,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn command_line() {
        let launcher = SumoLauncher::with_sumo_home(Path::new("/opt/sumo"), &config(9000));
        let cmd = launcher.command();
        assert_eq!(Path::new(cmd.get_program()), Path::new("/opt/sumo/bin/sumo-gui"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["-c", "scenario.sumocfg", "--remote-port", "9000"]);
    }

    #[test]
    fn headless_uses_sumo_binary() {
        let cfg = SimulationConfig { rendering: Rendering::Headless, ..config(9000) };
        let launcher = SumoLauncher::with_sumo_home(Path::new("/opt/sumo"), &cfg);
        assert!(launcher.binary().ends_with("bin/sumo"));
    }

    #[test]
    fn attach_gives_up_on_closed_port() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let launcher = SumoLauncher::with_sumo_home(Path::new("/opt/sumo"), &config(port));
        assert!(matches!(launcher.attach(), Err(TraciError::Connect(_))));
    }

    #[test]
    fn attach_handshakes_with_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let replies = [
                version_reply(),
                get_reply(CMD_GET_SIM_VARIABLE, VAR_DELTA_T, "", TraciValue::Double(0.5)),
                status_reply(CMD_CLOSE),
            ];
            for reply in replies {
                let mut len = [0u8; 4];
                sock.read_exact(&mut len).unwrap();
                let mut body = vec![0u8; i32::from_be_bytes(len) as usize - 4];
                sock.read_exact(&mut body).unwrap();
                sock.write_all(&reply).unwrap();
            }
        });

        let launcher = SumoLauncher::with_sumo_home(Path::new("/opt/sumo"), &config(port));
        let mut sim = launcher.attach().unwrap();
        assert_eq!(sim.step_length_secs(), 0.5);
        sim.close().unwrap();
        server.join().unwrap();
    }
}
