// ==========================================
// 物料尺寸导入集成测试
// ==========================================


use std::io::Write;
use std::sync::Arc;
use tempfile::Builder;
use test_helpers::{create_test_db, shared_conn};
use warehouse_slotting::importer::{CubageImporter, ImportError};
use warehouse_slotting::repository::ItemCubageRepository;

fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_import_csv_into_item_cubage() {
    let (_db, db_path) = create_test_db().unwrap();
    let repo = Arc::new(ItemCubageRepository::from_connection(shared_conn(&db_path)));
    let importer = CubageImporter::new(repo.clone());

    let csv = write_csv(&[
        "ITEM,Comprimento,Largura,Altura,Cubagem,Cx_Lastro",
        "4001,0.4,0.3,0.5,0.06,10",
        "4002,\"0,6\",\"0,4\",\"0,25\",\"0,06\",8",
        "4003,0.4,0.3,,0.06,",
        "4004,0.4,abc,0.5,0.06,10",
        ",0.4,0.3,0.5,0.06,10",
    ]);

    let report = importer.import_file(csv.path()).unwrap();

    assert_eq!(report.total_rows, 5);
    assert_eq!(report.imported, 3);
    assert_eq!(report.rejected.len(), 2);
    assert_eq!(report.rejected[0].row, 4);
    assert_eq!(report.rejected[1].row, 5);

    let comma = repo.find_by_item("4002").unwrap().unwrap();
    assert_eq!(comma.height, Some(0.25));
    assert!(comma.is_complete());

    let partial = repo.find_by_item("4003").unwrap().unwrap();
    assert!(!partial.is_complete());
    assert_eq!(partial.missing_fields(), vec!["height", "units_per_layer"]);

    assert!(repo.find_by_item("4004").unwrap().is_none());
}

#[test]
fn test_reimport_overwrites_dimensions() {
    let (_db, db_path) = create_test_db().unwrap();
    let repo = Arc::new(ItemCubageRepository::from_connection(shared_conn(&db_path)));
    let importer = CubageImporter::new(repo.clone());

    let first = write_csv(&["Item,Altura,Cx_Lastro", "4001,0.5,10"]);
    importer.import_file(first.path()).unwrap();
    let second = write_csv(&["Item,Altura,Cx_Lastro", "4001,0.6,12"]);
    importer.import_file(second.path()).unwrap();

    let dims = repo.find_by_item("4001").unwrap().unwrap();
    assert_eq!(dims.height, Some(0.6));
    assert_eq!(dims.units_per_layer, Some(12.0));
}

#[test]
fn test_missing_item_column_is_rejected() {
    let (_db, db_path) = create_test_db().unwrap();
    let repo = Arc::new(ItemCubageRepository::from_connection(shared_conn(&db_path)));
    let importer = CubageImporter::new(repo);

    let csv = write_csv(&["Codigo,Altura", "4001,0.5"]);
    assert!(matches!(
        importer.import_file(csv.path()),
        Err(ImportError::MissingColumn(_))
    ));
}
