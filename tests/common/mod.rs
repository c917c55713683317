#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use dealer_visits::domain::agency::{Agency, SourceEncoding};
use dealer_visits::models::config::LoaderConfig;
use dealer_visits::repository::CsvRepository;
use dealer_visits::repository::cache::DatasetCache;
use dealer_visits::repository::source::CsvSource;
use tempfile::TempDir;

pub const MONTERREY_CSV: &str = "\
SERIE,MODELO,ANIO,NOMBRE_FACTURA,NOMBRE_CONTACTO,AGENCIA,TEL_MOVIL,TEL_CASA,PAQUETE,ASESOR,ULTIMA_VISITA,DIAS_SIN_VENIR
3VW1K7AJ5FM000001,Jetta,2019,Transportes del Norte,Ana Garza,Monterrey,+528112223333,,Oro,Luis,2024-01-15,10
3VW1K7AJ5FM000002,Vento,2021,Maria Lopez,Maria Lopez,Monterrey,,8183334444,null,Luis,15/02/2024,200
3VWDEF7AJ5FM00003,Jetta,2018,Flotillas SA,,Monterrey,,,,Carla,,4801
,Tiguan,2022,Sin Serie,,Monterrey,,,,,,5
3VW1K7AJ5FM000004,Tiguan,2022,Pedro Ruiz,Pedro Ruiz,Monterrey,8119998888,,Plata,,2024-03-01,0
";

pub const SALTILLO_CSV: &str = "\
SERIE,MODELO,ANIO,NOMBRE_FACTURA,AGENCIA,DIAS_SIN_VENIR
3VWSAL7AJ5FM00001,Polo,2020,Jos\u{e9} Pe\u{f1}a,Saltillo,30
3VWSAL7AJ5FM00002,Polo,2023,Nu\u{f1}ez Hermanos,Saltillo,45
";

/// Temporary data directory holding agency exports.
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let data = Self { dir };
        data.write("monterrey.csv", MONTERREY_CSV.as_bytes());
        data.write("saltillo.csv", &latin1(SALTILLO_CSV));
        data
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, file: &str, body: &[u8]) {
        std::fs::write(self.dir.path().join(file), body).expect("write data file");
    }

    pub fn agencies(&self) -> Vec<Agency> {
        vec![
            agency("monterrey", "Monterrey Centro", "monterrey.csv", SourceEncoding::Utf8),
            agency("saltillo", "Saltillo", "saltillo.csv", SourceEncoding::Latin1),
            agency("apodaca", "Apodaca", "apodaca.csv", SourceEncoding::Utf8),
        ]
    }

    /// Repository without retry delays so failing loads finish quickly.
    pub fn repository(&self) -> CsvRepository {
        self.repository_with_delay(0)
    }

    /// Repository retrying three times with a fixed `retry_delay_ms` pause.
    pub fn repository_with_delay(&self, retry_delay_ms: u64) -> CsvRepository {
        let options = LoaderConfig {
            fetch_attempts: 3,
            retry_delay_ms,
            min_body_bytes: 50,
        };
        CsvRepository::new(
            CsvSource::directory(self.path()),
            self.agencies(),
            options,
            Arc::new(DatasetCache::new()),
        )
    }
}

pub fn agency(id: &str, name: &str, file: &str, encoding: SourceEncoding) -> Agency {
    Agency {
        id: id.try_into().expect("valid agency id"),
        name: name.to_string(),
        file: file.to_string(),
        encoding,
        columns: Default::default(),
    }
}

fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).expect("latin1 character"))
        .collect()
}
