#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::tempdir;
    use crate::aggregate::{
        aggregate_file, process, serializer, BatchProcessor, IpValidation, RejectKind, SiftConfig,
        SiftError,
    };

    const HEADER: &str = "User ID,TimeStamp,Activity,Count,IP Address";

    fn csv(rows: &[&str]) -> String {
        let mut input = String::from(HEADER);
        for row in rows {
            input.push('\n');
            input.push_str(row);
        }
        input.push('\n');
        input
    }

    #[test]
    fn test_duplicate_row_contributes_once() {
        let input = csv(&[
            "user_0075,2023-05-05 15:20:39,login,4,109.204.222.253",
            "user_0075,2023-05-05 15:20:39,login,4,109.204.222.253",
        ]);

        let outcome = process(input.as_bytes(), 10).unwrap();
        let acc = outcome.accumulator.get("user_0075").unwrap();

        assert_eq!(acc.total_count, 4);
        assert_eq!(acc.activities, vec!["login"]);
        assert_eq!(outcome.stats.accepted_records, 1);
        assert_eq!(outcome.stats.rejected_for(RejectKind::DuplicateRecord), 1);
    }

    #[test]
    fn test_duplicate_detected_across_batches() {
        let input = csv(&[
            "u1,2023-05-05 15:20:39,login,4,1.2.3.4",
            "u2,2023-05-05 15:21:00,view,1,1.2.3.5",
            "u3,2023-05-05 15:22:00,view,1,1.2.3.6",
            "u4,2023-05-05 15:23:00,view,1,1.2.3.7",
            "u1,2023-05-05 15:20:39,login,4,1.2.3.4",
        ]);

        // Batch size 2 puts the repeat in the third batch
        let outcome = process(input.as_bytes(), 2).unwrap();
        assert_eq!(outcome.stats.batches_processed, 3);
        assert_eq!(outcome.stats.rejected_for(RejectKind::DuplicateRecord), 1);
        assert_eq!(outcome.accumulator.get("u1").unwrap().total_count, 4);
    }

    #[test]
    fn test_malformed_count_creates_no_user() {
        let input = csv(&[
            "user_bad,2023-05-05 15:20:39,login,abc,1.2.3.4",
            "user_ok,2023-05-05 15:20:39,login,2,1.2.3.4",
        ]);

        let outcome = process(input.as_bytes(), 10).unwrap();
        assert!(!outcome.accumulator.contains("user_bad"));
        assert!(outcome.accumulator.contains("user_ok"));
        assert_eq!(outcome.stats.rejected_for(RejectKind::MalformedCount), 1);
    }

    #[test]
    fn test_strict_ip_rejection() {
        let input = csv(&["u1,2023-05-05 15:20:39,login,1,999.1.1.1"]);

        let outcome = process(input.as_bytes(), 10).unwrap();
        assert!(outcome.accumulator.is_empty());
        assert_eq!(outcome.stats.rejected_for(RejectKind::MalformedIp), 1);

        let config = SiftConfig {
            ip_validation: IpValidation::Permissive,
            ..SiftConfig::default()
        };
        let outcome = BatchProcessor::new(config).unwrap().process(input.as_bytes()).unwrap();
        assert_eq!(outcome.accumulator.get("u1").unwrap().ip_addresses, vec!["999.1.1.1"]);
    }

    #[test]
    fn test_rejection_breakdown() {
        let input = csv(&[
            "u1,2023-05-05 15:20:39,login,1,1.2.3.4",
            "u2,,login,1,1.2.3.4",
            "u3,2023-05-05 15:20:39,login,x,1.2.3.4",
            "u4,2023-05-05 15:20:39,login,1,300.2.3.4",
            "u5,05/05/2023 15:20,login,1,1.2.3.4",
            "u1,2023-05-05 15:20:39,login,1,1.2.3.4",
            "u6,2023-05-05 15:20:39",
        ]);

        let stats = process(input.as_bytes(), 3).unwrap().stats;
        assert_eq!(stats.total_rows, 7);
        assert_eq!(stats.accepted_records, 1);
        assert_eq!(stats.rejected_for(RejectKind::MissingField), 2);
        assert_eq!(stats.rejected_for(RejectKind::MalformedCount), 1);
        assert_eq!(stats.rejected_for(RejectKind::MalformedIp), 1);
        assert_eq!(stats.rejected_for(RejectKind::MalformedTimestamp), 1);
        assert_eq!(stats.rejected_for(RejectKind::DuplicateRecord), 1);
        assert_eq!(stats.rejected_total(), 6);
        assert_eq!(stats.unique_users, 1);
    }

    #[test]
    fn test_invalid_row_does_not_consume_fingerprint() {
        // A rejected row must not cause a later valid copy to be treated as a repeat
        let input = csv(&[
            "u1,2023-05-05 15:20:39,login,1,999.2.3.4",
            "u1,2023-05-05 15:20:39,login,1,1.2.3.4",
        ]);

        let stats = process(input.as_bytes(), 1).unwrap().stats;
        assert_eq!(stats.accepted_records, 1);
        assert_eq!(stats.rejected_for(RejectKind::DuplicateRecord), 0);
    }

    #[test]
    fn test_batch_size_invariance() {
        let input = csv(&[
            "u1,2023-05-05 15:20:39,login,1,1.2.3.4",
            "u2,2023-05-05 15:21:39,view,3,1.2.3.5",
            "u1,2023-05-05 15:22:39,logout,2,1.2.3.4",
            "u1,2023-05-05 15:20:39,login,1,1.2.3.4",
            "u2,2023-05-05 15:23:39,view,3,10.0.0.1",
            "u3,2023-05-05 15:24:39,view,0,10.0.0.2",
        ]);

        let one = process(input.as_bytes(), 1).unwrap();
        let all = process(input.as_bytes(), 6).unwrap();
        let odd = process(input.as_bytes(), 4).unwrap();

        assert_eq!(one.accumulator, all.accumulator);
        assert_eq!(odd.accumulator, all.accumulator);
        assert_eq!(one.stats.batches_processed, 6);
        assert_eq!(all.stats.batches_processed, 1);
        assert_eq!(
            all.accumulator.get("u1").unwrap().activities,
            vec!["login", "logout"]
        );
    }

    #[test]
    fn test_runs_do_not_share_seen_state() {
        let input = csv(&["u1,2023-05-05 15:20:39,login,1,1.2.3.4"]);
        let processor = BatchProcessor::new(SiftConfig::default()).unwrap();

        let first = processor.process(input.as_bytes()).unwrap();
        let second = processor.process(input.as_bytes()).unwrap();
        assert_eq!(first.stats.accepted_records, 1);
        assert_eq!(second.stats.accepted_records, 1);
    }

    #[test]
    fn test_header_only_input() {
        let outcome = process(csv(&[]).as_bytes(), 10).unwrap();
        assert!(outcome.accumulator.is_empty());
        assert_eq!(outcome.stats.total_rows, 0);
        assert_eq!(outcome.stats.batches_processed, 0);
    }

    #[test]
    fn test_total_count_beyond_u64_range() {
        let input = csv(&[
            "u1,2023-05-05 15:20:39,login,18446744073709551615,1.2.3.4",
            "u1,2023-05-05 15:20:40,login,1,1.2.3.4",
        ]);

        let outcome = process(input.as_bytes(), 1).unwrap();
        let acc = outcome.accumulator.get("u1").unwrap();
        assert_eq!(acc.total_count, u128::from(u64::MAX) + 1);
        assert_eq!(acc.activities.len(), 2);
        assert_eq!(outcome.accumulator.total_count(), u128::from(u64::MAX) + 1);

        let document = serializer::serialize(&outcome.accumulator).unwrap();
        assert!(document.contains("\"total_count\": 18446744073709551616"));
        assert_eq!(serializer::deserialize(&document).unwrap(), outcome.accumulator);
    }

    #[test]
    fn test_oversized_batch_size_is_clamped() {
        let input = csv(&[
            "u1,2023-05-05 15:20:39,login,1,1.2.3.4",
            "u2,2023-05-05 15:21:39,view,3,1.2.3.5",
            "u1,2023-05-05 15:20:39,login,1,1.2.3.4",
        ]);

        let huge = process(input.as_bytes(), usize::MAX).unwrap();
        let single = process(input.as_bytes(), 1).unwrap();

        assert_eq!(huge.accumulator, single.accumulator);
        assert_eq!(huge.stats.batches_processed, 1);
        assert_eq!(huge.stats.accepted_records, 2);
    }

    #[test]
    fn test_whitespace_only_field_is_accepted() {
        let input = csv(&[
            "u1,2023-05-05 15:20:39, ,1,1.2.3.4",
            "u2,2023-05-05 15:20:39,,1,1.2.3.4",
        ]);

        let outcome = process(input.as_bytes(), 10).unwrap();
        assert_eq!(outcome.accumulator.get("u1").unwrap().activities, vec![" "]);
        assert!(!outcome.accumulator.contains("u2"));
        assert_eq!(outcome.stats.accepted_records, 1);
        assert_eq!(outcome.stats.rejected_for(RejectKind::MissingField), 1);
    }

    #[test]
    fn test_aggregate_file_writes_output() {
        let temp_dir = tempdir().unwrap();
        let input_file = temp_dir.path().join("user_activities.csv");
        let output_file = temp_dir.path().join("aggregated_activities.json");

        fs::write(&input_file, csv(&[
            "user_0075,2023-05-05 15:20:39,login,4,109.204.222.253",
            "user_0075,2023-05-05 15:30:00,logout,1,109.204.222.253",
        ])).unwrap();

        let stats = aggregate_file(&input_file, &output_file, SiftConfig::default()).unwrap();
        assert_eq!(stats.accepted_records, 2);

        let document: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output_file).unwrap()).unwrap();
        assert_eq!(document["user_0075"]["total_count"], 5);
        assert_eq!(document["user_0075"]["activities"][1], "logout");
    }

    #[test]
    fn test_schema_error_leaves_no_output() {
        let temp_dir = tempdir().unwrap();
        let input_file = temp_dir.path().join("input.csv");
        let output_file = temp_dir.path().join("output.json");

        fs::write(&input_file, "User ID,TimeStamp,Activity,Count\nu1,2023-05-05 15:20:39,login,1\n").unwrap();

        let result = aggregate_file(&input_file, &output_file, SiftConfig::default());
        match result {
            Err(SiftError::Schema { missing }) => assert_eq!(missing, vec!["IP Address"]),
            other => panic!("expected schema error, got {:?}", other),
        }
        assert!(!output_file.exists());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let temp_dir = tempdir().unwrap();
        let result = aggregate_file(
            &temp_dir.path().join("absent.csv"),
            &temp_dir.path().join("out.json"),
            SiftConfig::default(),
        );
        assert!(matches!(result, Err(SiftError::Io(_))));
    }
}
