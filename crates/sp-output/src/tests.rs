//! Tests for sp-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{SessionRow, TickSummaryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn session_row(vehicle: &str, outcome: &'static str) -> SessionRow {
        SessionRow {
            traffic_light:   "J1".into(),
            vehicle:         vehicle.into(),
            lane:            "e_0".into(),
            opened_at:       4,
            closed_at:       12,
            original_phase:  0,
            phase_count:     3,
            queue_length:    7,
            urgency:         1.0,
            green_secs:      32.5,
            used_fallback:   0,
            outcome,
            clearance_ticks: 5,
            restored_phase:  Some(2),
            error:           None,
        }
    }

    fn read(path: &std::path::Path) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("sessions.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn missing_dir_created() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("a");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join("sessions.csv").exists());
    }

    #[test]
    fn csv_headers_without_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (headers, rows) = read(&dir.path().join("sessions.csv"));
        assert_eq!(headers[0], "traffic_light");
        assert_eq!(headers.len(), 15);
        assert!(rows.is_empty());

        let (headers, _) = read(&dir.path().join("tick_summaries.csv"));
        assert_eq!(headers, ["tick", "vehicles", "skipped", "request_vehicle"]);
    }

    #[test]
    fn session_rows_written_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_session(&session_row("ev0", "completed")).unwrap();
        let mut failed = session_row("ev1", "aborted");
        failed.restored_phase = None;
        failed.error = Some("lost contact".into());
        w.write_session(&failed).unwrap();
        w.finish().unwrap();

        let (headers, rows) = read(&dir.path().join("sessions.csv"));
        assert_eq!(rows.len(), 2);
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();

        assert_eq!(&rows[0][col("vehicle")], "ev0");
        assert_eq!(&rows[0][col("outcome")], "completed");
        assert_eq!(&rows[0][col("green_secs")], "32.5");
        assert_eq!(&rows[0][col("restored_phase")], "2");
        assert_eq!(&rows[0][col("error")], "");

        assert_eq!(&rows[1][col("outcome")], "aborted");
        assert_eq!(&rows[1][col("restored_phase")], "");
        assert_eq!(&rows[1][col("error")], "lost contact");
    }

    #[test]
    fn tick_summary_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow { tick: 3, vehicles: 9, skipped: 1, request_vehicle: None })
            .unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick:            4,
            vehicles:        9,
            skipped:         0,
            request_vehicle: Some("ev0".into()),
        })
        .unwrap();
        w.finish().unwrap();

        let (_, rows) = read(&dir.path().join("tick_summaries.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "9");
        assert_eq!(&rows[0][2], "1");
        assert_eq!(&rows[0][3], "");
        assert_eq!(&rows[1][3], "ev0");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod observer_tests {
    use sp_core::{AppConfig, Tick, VehicleCategory};
    use sp_fuzzy::FuzzyInferenceEngine;
    use sp_preempt::{ControlLoopBuilder, PreemptionObserver, RunSummary, ScanReport};
    use sp_sim::{ScriptedSimulatorBuilder, ScriptedVehicle};

    use crate::writer::OutputWriter;
    use crate::{CsvWriter, OutputError, OutputResult, SessionLogObserver, SessionRow, TickSummaryRow};

    /// A writer that fails every tick summary.
    #[derive(Default)]
    struct Failing {
        sessions: Vec<SessionRow>,
        finished: usize,
    }

    impl OutputWriter for Failing {
        fn write_session(&mut self, row: &SessionRow) -> OutputResult<()> {
            self.sessions.push(row.clone());
            Ok(())
        }

        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other("disk full")))
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn first_write_error_kept() {
        let mut obs = SessionLogObserver::new(Failing::default());
        obs.on_tick_end(Tick(1), &ScanReport::default());
        obs.on_tick_end(Tick(2), &ScanReport::default());
        obs.on_run_end(&RunSummary::default());

        let err = obs.take_error().expect("stored error");
        assert!(err.to_string().contains("disk full"));
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().finished, 1);
    }

    #[test]
    fn integration_csv() {
        let engine = FuzzyInferenceEngine::green_time().unwrap();
        let sim = ScriptedSimulatorBuilder::new()
            .traffic_light("J1", [("GGrr", 30.0), ("rrGG", 30.0), ("yyyy", 3.0)])
            .controlled_lanes("J1", ["n_0", "n_1", "e_0", "e_1"])
            .lane("e_0", 29)
            .vehicle(ScriptedVehicle::new("ev0", VehicleCategory::Emergency, "e_0").clears_after(3))
            .build()
            .unwrap();
        let mut control = ControlLoopBuilder::new(sim, &engine, &AppConfig::default()).build().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut obs = SessionLogObserver::new(CsvWriter::new(dir.path()).unwrap());
        control.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(obs.sessions_written(), 1);

        let mut rdr = csv::Reader::from_path(dir.path().join("sessions.csv")).unwrap();
        let headers = rdr.headers().unwrap().clone();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        assert_eq!(&rows[0][col("vehicle")], "ev0");
        assert_eq!(&rows[0][col("lane")], "e_0");
        assert_eq!(&rows[0][col("queue_length")], "30");
        assert_eq!(&rows[0][col("outcome")], "completed");
        assert_eq!(&rows[0][col("opened_at")], "1");
        assert_eq!(&rows[0][col("closed_at")], "7");
        assert_eq!(&rows[0][col("restored_phase")], "2");

        // One scan happens before the session consumes the rest of the run.
        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][3], "ev0");
    }
}
