pub mod configuration;
pub mod configurationerror;

pub mod math {
    pub mod integration {
        pub mod integrationerror;
        pub mod interval;
        pub mod integrand;
        pub mod tolerance;
        pub mod rightrectangleintegrator;
        pub mod partialsumreducer;
        pub mod rangepartitioner;
        pub mod parallelintegrator;
    }
}

mod proptests;
