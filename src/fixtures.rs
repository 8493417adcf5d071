#[cfg(test)]
pub mod test {
    use serde::{Deserialize, Serialize};

    use crate::record::{Field, Record, Tags};

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct SampleConfig {
        pub server: String,
        pub port: i64,
        pub debug: bool,
        pub timeout: Option<u32>,
        pub database: SampleDb,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct SampleDb {
        #[serde(rename = "type")]
        pub kind: String,
        pub port: u16,
    }

    impl Record for SampleConfig {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::value(Tags::new("server"), &mut self.server),
                Field::value(Tags::new("port"), &mut self.port),
                Field::value(Tags::new("debug"), &mut self.debug),
                Field::value(Tags::new("timeout"), &mut self.timeout),
                Field::record(Tags::new("database"), &mut self.database),
            ]
        }
    }

    impl Record for SampleDb {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::value(Tags::new("kind").json("type"), &mut self.kind),
                Field::value(Tags::new("port"), &mut self.port),
            ]
        }
    }

    // -- Optional nested record ------------------------------------------------

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct NestedValue {
        pub value: String,
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct PointerConfig {
        pub nested: Option<NestedValue>,
    }

    impl Record for NestedValue {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::value(Tags::new("value"), &mut self.value)]
        }
    }

    impl Record for PointerConfig {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::optional(Tags::new("nested"), &mut self.nested)]
        }
    }

    // -- Skip sentinel, private field and unsupported kind ---------------------

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct EnvOnlyConfig {
        pub skip: String,
        #[serde(skip)]
        pub visible: String,
        pub value: String,
        pub values: Vec<String>,
    }

    impl Record for EnvOnlyConfig {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::value(Tags::new("skip").env("-"), &mut self.skip),
                Field::value(Tags::new("visible").unexported(), &mut self.visible),
                Field::value(Tags::new("value"), &mut self.value),
                Field::value(Tags::new("values"), &mut self.values),
            ]
        }
    }

    // -- Single string field, the shape most file tests need -------------------

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    #[serde(default)]
    pub struct ServerOnly {
        pub server: String,
    }

    impl Record for ServerOnly {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::value(Tags::new("server"), &mut self.server)]
        }
    }

    #[test]
    fn sample_config_describes_fields_in_order() {
        let mut cfg = SampleConfig::default();
        let names: Vec<&str> = cfg.fields().iter().map(|f| f.tags.name()).collect();
        assert_eq!(names, ["server", "port", "debug", "timeout", "database"]);
    }
}
