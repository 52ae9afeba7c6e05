//! Integration tests for aco-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{CYCLE_SUMMARY_HEADER, CsvWriter, PHEROMONE_HEADER};
    use crate::row::{CycleSummaryRow, PheromoneRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn pheromone_row(cycle: u32, from: &str, to: &str) -> PheromoneRow {
        PheromoneRow { cycle, from: from.into(), to: to.into(), distance: 1.5, pheromone: 0.25 }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("cycle_summaries.csv").exists());
        assert!(dir.path().join("pheromone_levels.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("cycle_summaries.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, CYCLE_SUMMARY_HEADER);

        let mut rdr2 = csv::Reader::from_path(dir.path().join("pheromone_levels.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, PHEROMONE_HEADER);
    }

    #[test]
    fn summary_without_solution_leaves_columns_empty() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_cycle_summary(&CycleSummaryRow {
            cycle:         1,
            tick:          4,
            population:    5,
            best_distance: None,
            best_path:     None,
            termination:   None,
        })
        .unwrap();
        w.write_cycle_summary(&CycleSummaryRow {
            cycle:         2,
            tick:          8,
            population:    5,
            best_distance: Some(418.0),
            best_path:     Some("Arad, Sibiu, Rimnicu Vilcea, Pitesti, Bucharest".into()),
            termination:   Some("stagnated behaviour".into()),
        })
        .unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("cycle_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][3], "");
        assert_eq!(&rows[0][5], "");
        assert_eq!(&rows[1][3], "418");
        assert_eq!(&rows[1][4], "Arad, Sibiu, Rimnicu Vilcea, Pitesti, Bucharest");
        assert_eq!(&rows[1][5], "stagnated behaviour");
    }

    #[test]
    fn pheromone_rows_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_pheromones(&[pheromone_row(1, "A", "B"), pheromone_row(1, "B", "C")]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("pheromone_levels.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][1], "B");
        assert_eq!(&rows[1][2], "C");
        assert_eq!(&rows[1][3], "1.5");
        assert_eq!(&rows[1][4], "0.25");
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("absent")).is_err());
    }
}

#[cfg(test)]
mod observer_tests {
    use std::time::Duration;

    use aco_core::ColonyConfig;
    use aco_sim::ColonyBuilder;
    use tempfile::TempDir;

    use crate::{ColonyOutputObserver, CsvWriter, CycleSummaryRow, OutputError, OutputResult, OutputWriter, PheromoneRow};

    fn diamond(max_cycles: u32) -> ColonyConfig {
        ColonyConfig {
            topology:         "diamond".into(),
            start:            "A".into(),
            destination:      "D".into(),
            max_cycles,
            tick_period:      Duration::ZERO,
            response_timeout: Some(Duration::from_secs(1)),
            ..ColonyConfig::default()
        }
    }

    /// An empty colony closes one cycle per tick, which makes the row count
    /// deterministic.
    #[test]
    fn observer_writes_one_summary_per_cycle() {
        let dir = TempDir::new().unwrap();
        let observer = ColonyOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        let errors = observer.errors();
        let colony = ColonyBuilder::new(diamond(3)).observer(observer).build().unwrap();

        while !colony.run_tick().unwrap() {}
        assert!(errors.take().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join("cycle_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][1], "1");
        assert_eq!(&rows[0][2], "0");
        assert_eq!(&rows[0][5], "");
        assert_eq!(&rows[2][5], "cycles exhausted");

        let mut rdr = csv::Reader::from_path(dir.path().join("pheromone_levels.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3 * 4);
        assert_eq!(&rows[0][1], "A");
        assert_eq!(&rows[0][2], "B");
        assert_eq!(&rows[0][3], "1");
    }

    struct Broken;

    impl OutputWriter for Broken {
        fn write_cycle_summary(&mut self, _row: &CycleSummaryRow) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other("disk full")))
        }

        fn write_pheromones(&mut self, _rows: &[PheromoneRow]) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other("disk still full")))
        }

        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn first_write_error_is_kept() {
        let observer = ColonyOutputObserver::new(Broken);
        let errors = observer.errors();
        let colony = ColonyBuilder::new(diamond(2)).observer(observer).build().unwrap();

        while !colony.run_tick().unwrap() {}
        let err = errors.take().expect("an error was stored");
        assert!(err.to_string().contains("disk full"));
        assert!(errors.take().is_none());
    }
}
