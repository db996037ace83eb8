mod property_replay;
