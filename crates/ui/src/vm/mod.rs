mod pathway_vm;

pub use pathway_vm::{
    CardStatus, LATE_COMPLETION_NOTICE, LevelCardVm, PathwayVm, ProgressHeaderVm, map_pathway,
};
